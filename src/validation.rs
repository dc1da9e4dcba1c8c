use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::CyclesHistory;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("cannot mark future days (first: {first})")]
    FutureDays { first: NaiveDate },
    #[error("period already marked for {date}")]
    AlreadyMarked { date: NaiveDate },
}

/// Which dates a one-tap "period started today" action adds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillPolicy {
    /// Only today.
    #[default]
    TodayOnly,
    /// Today plus the unmarked days since the latest marked date, when that
    /// gap is at most `max_gap_days`.
    BridgeGap { max_gap_days: u32 },
}

/// True if any date lies strictly after `today`.
pub fn is_marked_future_days<'a, I>(dates: I, today: NaiveDate) -> bool
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    dates.into_iter().any(|date| *date > today)
}

/// Reject an edit containing future dates.
pub fn validate_edit<'a, I>(dates: I, today: NaiveDate) -> Result<(), EditError>
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    match dates.into_iter().filter(|date| **date > today).min() {
        Some(first) => Err(EditError::FutureDays { first: *first }),
        None => Ok(()),
    }
}

/// Whether `date` can be picked in an editing calendar: any day up to and
/// including today.
pub fn is_active_date(date: NaiveDate, today: NaiveDate) -> bool {
    date <= today
}

pub fn is_period_today(history: &CyclesHistory, today: NaiveDate) -> bool {
    history.last_period_days().contains(&today)
}

/// Dates to add when the user marks "period started today".
///
/// The result always contains `today` and never a later date.
pub fn past_future_fill_days(
    history: &CyclesHistory,
    today: NaiveDate,
    policy: FillPolicy,
) -> BTreeSet<NaiveDate> {
    let mut days = BTreeSet::from([today]);

    let FillPolicy::BridgeGap { max_gap_days } = policy else {
        return days;
    };
    let Some(latest) = history
        .latest()
        .map(|c| c.end_date())
        .filter(|end| *end < today)
    else {
        return days;
    };

    let missing = (today - latest).num_days() - 1;
    if missing > 0 && missing <= i64::from(max_gap_days) {
        days.extend((1..=missing).map(|offset| latest + Duration::days(offset)));
    }
    days
}
