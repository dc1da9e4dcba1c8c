use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{CalendarDay, CyclesHistory, DayHighlight, MonthView};
use crate::prediction;
use crate::validation;

/// Styling for one rendered calendar day.
///
/// Recorded period days win over forecast ones, so a logged period never
/// shows as merely predicted.
pub fn highlight_date(
    date: NaiveDate,
    today: NaiveDate,
    history: &CyclesHistory,
) -> Option<DayHighlight> {
    if history.is_empty() {
        return None;
    }
    if history.is_recorded(date) {
        Some(DayHighlight::RecordedPeriod)
    } else if date == today && prediction::is_forecast_period_today(history, today) {
        Some(DayHighlight::ForecastToday)
    } else if prediction::is_forecast_period_days(date, history) {
        Some(DayHighlight::ForecastPeriod)
    } else {
        None
    }
}

/// Every day of a month, annotated for display. `None` for an invalid month.
pub fn month_view(
    year: i32,
    month: u32,
    today: NaiveDate,
    history: &CyclesHistory,
) -> Option<MonthView> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last_day = next_month - Duration::days(1);

    let days = first_day
        .iter_days()
        .take_while(|date| *date <= last_day)
        .map(|date| CalendarDay {
            date,
            highlight: highlight_date(date, today, history),
            selectable: validation::is_active_date(date, today),
            is_today: date == today,
        })
        .collect();

    Some(MonthView {
        year: first_day.year(),
        month: first_day.month(),
        days,
    })
}
