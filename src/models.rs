use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A calendar day on which bleeding was recorded.
pub type PeriodDate = NaiveDate;

/// One contiguous run of period dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cycle {
    pub start_date: PeriodDate,
    pub period_dates: Vec<PeriodDate>,
    /// Days until the next cycle starts. `None` for the latest cycle.
    pub cycle_length: Option<u32>,
}

impl Cycle {
    pub fn period_length(&self) -> usize {
        self.period_dates.len()
    }

    pub fn end_date(&self) -> PeriodDate {
        self.period_dates.last().copied().unwrap_or(self.start_date)
    }

    pub fn contains(&self, date: PeriodDate) -> bool {
        self.period_dates.binary_search(&date).is_ok()
    }
}

/// Cycles ordered by start date, oldest first.
///
/// Only serializable: a history is always rebuilt from marked dates.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CyclesHistory(Vec<Cycle>);

impl CyclesHistory {
    /// Callers must uphold the ordering invariants; use
    /// [`crate::history::build_history`] for untrusted input.
    pub(crate) fn from_cycles(cycles: Vec<Cycle>) -> Self {
        Self(cycles)
    }

    pub fn latest(&self) -> Option<&Cycle> {
        self.0.last()
    }

    /// Every recorded period date, ascending.
    pub fn period_dates(&self) -> Vec<PeriodDate> {
        self.0
            .iter()
            .flat_map(|c| c.period_dates.iter().copied())
            .collect()
    }

    /// Dates of the most recent cycle, or nothing for an empty history.
    pub fn last_period_days(&self) -> &[PeriodDate] {
        self.latest()
            .map(|c| c.period_dates.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `date` was recorded in any cycle.
    pub fn is_recorded(&self, date: PeriodDate) -> bool {
        let idx = self.0.partition_point(|c| c.start_date <= date);
        idx > 0 && self.0[idx - 1].contains(date)
    }
}

impl Deref for CyclesHistory {
    type Target = [Cycle];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastTitle {
    NoData,
    DayOfPeriod,
    UntilPeriod,
}

impl ForecastTitle {
    /// Untranslated key; the presentation layer owns the wording.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastTitle::NoData => "no data",
            ForecastTitle::DayOfPeriod => "day of period",
            ForecastTitle::UntilPeriod => "until period",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaysBeforePeriod {
    pub title: ForecastTitle,
    pub days: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyChance {
    Unknown,
    Low,
    Medium,
    High,
}

impl PregnancyChance {
    pub fn as_str(&self) -> &'static str {
        match self {
            PregnancyChance::Unknown => "unknown",
            PregnancyChance::Low => "low",
            PregnancyChance::Medium => "medium",
            PregnancyChance::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub predicted_start: NaiveDate,
    pub predicted_end: NaiveDate,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilityWindow {
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub ovulation_day: NaiveDate,
    pub peak_start: NaiveDate,
    pub peak_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleStats {
    pub total_cycles: usize,
    pub avg_cycle_length: Option<f32>,
    pub avg_period_length: Option<f32>,
    pub shortest_cycle: Option<u32>,
    pub longest_cycle: Option<u32>,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
}

/// How a single calendar day should be styled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayHighlight {
    ForecastToday,
    ForecastPeriod,
    RecordedPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub highlight: Option<DayHighlight>,
    pub selectable: bool,
    pub is_today: bool,
}

/// Data returned to the presentation layer for a month view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}
