use chrono::{Duration, NaiveDate};

use crate::models::{
    CycleStats, CyclesHistory, DaysBeforePeriod, FertilityWindow, ForecastTitle, Prediction,
    PregnancyChance,
};

/// Cycle length assumed until two cycles have been recorded.
pub const DEFAULT_CYCLE_LENGTH: f64 = 28.0;
/// Period length assumed for an empty history.
pub const DEFAULT_PERIOD_LENGTH: f64 = 5.0;
/// Ovulation is assumed this many days before the next period.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
/// Upper bound on projected cycles when scanning for forecast days.
pub const FORECAST_HORIZON_CYCLES: i64 = 24;

/// Mean of all known cycle lengths, or [`DEFAULT_CYCLE_LENGTH`].
pub fn average_cycle_length(history: &CyclesHistory) -> f64 {
    let lengths: Vec<f64> = history
        .iter()
        .filter_map(|c| c.cycle_length.map(f64::from))
        .collect();
    if lengths.is_empty() {
        DEFAULT_CYCLE_LENGTH
    } else {
        mean(&lengths)
    }
}

/// Mean period length across all cycles, or [`DEFAULT_PERIOD_LENGTH`].
pub fn average_period_length(history: &CyclesHistory) -> f64 {
    let lengths: Vec<f64> = history.iter().map(|c| c.period_length() as f64).collect();
    if lengths.is_empty() {
        DEFAULT_PERIOD_LENGTH
    } else {
        mean(&lengths)
    }
}

/// Headline countdown: the current period day, or days left until the next one.
pub fn days_before_period(history: &CyclesHistory, today: NaiveDate) -> DaysBeforePeriod {
    let Some(internals) = calc_internals(history) else {
        return DaysBeforePeriod {
            title: ForecastTitle::NoData,
            days: 0,
        };
    };

    let day_of_cycle = internals.day_of_cycle(today);
    if (day_of_cycle as f64) < internals.avg_period {
        return DaysBeforePeriod {
            title: ForecastTitle::DayOfPeriod,
            days: day_of_cycle + 1,
        };
    }

    // last_start + cycle - today, without building a date that may overflow
    let elapsed = (today - internals.last_start).num_days();
    DaysBeforePeriod {
        title: ForecastTitle::UntilPeriod,
        days: (internals.cycle_days() - elapsed).max(0),
    }
}

/// Qualitative chance of conception on `today`, keyed by distance from the
/// estimated ovulation day of the current cycle.
pub fn pregnancy_chance(history: &CyclesHistory, today: NaiveDate) -> PregnancyChance {
    let Some(internals) = calc_internals(history) else {
        return PregnancyChance::Unknown;
    };

    let ovulation_day = internals.cycle_days() - LUTEAL_PHASE_DAYS;
    match (internals.day_of_cycle(today) - ovulation_day).abs() {
        0..=2 => PregnancyChance::High,
        3..=5 => PregnancyChance::Medium,
        _ => PregnancyChance::Low,
    }
}

/// Whether `date` falls inside a projected period window.
///
/// Windows start at the latest recorded cycle and repeat every average cycle
/// length, for at most [`FORECAST_HORIZON_CYCLES`] cycles.
pub fn is_forecast_period_days(date: NaiveDate, history: &CyclesHistory) -> bool {
    let Some(internals) = calc_internals(history) else {
        return false;
    };

    let cycle_days = internals.cycle_days();
    let period_days = internals.period_days();
    for k in 0..=FORECAST_HORIZON_CYCLES {
        let Some(start) = internals.last_start.checked_add_signed(Duration::days(k * cycle_days))
        else {
            return false;
        };
        if date < start {
            return false;
        }
        match start.checked_add_signed(Duration::days(period_days)) {
            Some(end) if date >= end => continue,
            // a window running past the last representable date holds every later date
            _ => return true,
        }
    }
    false
}

pub fn is_forecast_period_today(history: &CyclesHistory, today: NaiveDate) -> bool {
    is_forecast_period_days(today, history)
}

/// Predict the next period from the recorded history.
pub fn predict(history: &CyclesHistory) -> Option<Prediction> {
    let internals = calc_internals(history)?;

    let predicted_start = internals
        .last_start
        .checked_add_signed(Duration::days(internals.cycle_days()))?;
    let predicted_end =
        predicted_start.checked_add_signed(Duration::days(internals.period_days() - 1))?;

    let confidence = if internals.cycle_lengths.len() < 2 {
        0.5
    } else {
        let std_dev = std_deviation(&internals.cycle_lengths);
        (1.0 - (std_dev / internals.avg_cycle) as f32).clamp(0.1, 0.95)
    };

    Some(Prediction {
        predicted_start,
        predicted_end,
        confidence,
    })
}

/// Estimate the fertility window based on predicted next period.
/// Fertile window = ovulation - 5 to ovulation day, peak = ovulation - 2 to ovulation day.
pub fn fertility_window(history: &CyclesHistory) -> Option<FertilityWindow> {
    let prediction = predict(history)?;

    let ovulation_day = prediction
        .predicted_start
        .checked_sub_signed(Duration::days(LUTEAL_PHASE_DAYS))?;

    Some(FertilityWindow {
        fertile_start: ovulation_day.checked_sub_signed(Duration::days(5))?,
        fertile_end: ovulation_day,
        ovulation_day,
        peak_start: ovulation_day.checked_sub_signed(Duration::days(2))?,
        peak_end: ovulation_day,
    })
}

/// Compute cycle statistics for the stats view.
pub fn cycle_stats(history: &CyclesHistory) -> CycleStats {
    let Some(last) = history.latest() else {
        return CycleStats {
            total_cycles: 0,
            avg_cycle_length: None,
            avg_period_length: None,
            shortest_cycle: None,
            longest_cycle: None,
            last_period_start: None,
            last_period_end: None,
        };
    };

    let cycle_lengths: Vec<u32> = history.iter().filter_map(|c| c.cycle_length).collect();

    CycleStats {
        total_cycles: history.len(),
        avg_cycle_length: if cycle_lengths.is_empty() {
            None
        } else {
            Some(average_cycle_length(history) as f32)
        },
        avg_period_length: Some(average_period_length(history) as f32),
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        last_period_start: Some(last.start_date),
        last_period_end: Some(last.end_date()),
    }
}

struct PredictionInternals {
    avg_cycle: f64,
    avg_period: f64,
    cycle_lengths: Vec<f64>,
    last_start: NaiveDate,
}

impl PredictionInternals {
    /// Whole days in an average cycle, never less than one.
    fn cycle_days(&self) -> i64 {
        (self.avg_cycle.round() as i64).max(1)
    }

    fn period_days(&self) -> i64 {
        (self.avg_period.round() as i64).max(1)
    }

    /// Zero-based day of the current cycle, clamped at zero when `today`
    /// precedes the latest recorded start.
    fn day_of_cycle(&self, today: NaiveDate) -> i64 {
        (today - self.last_start).num_days().max(0)
    }
}

fn calc_internals(history: &CyclesHistory) -> Option<PredictionInternals> {
    let last_start = history.latest()?.start_date;

    let cycle_lengths: Vec<f64> = history
        .iter()
        .filter_map(|c| c.cycle_length.map(f64::from))
        .collect();

    Some(PredictionInternals {
        avg_cycle: average_cycle_length(history),
        avg_period: average_period_length(history),
        cycle_lengths,
        last_start,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
