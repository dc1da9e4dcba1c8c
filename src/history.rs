use crate::models::{Cycle, CyclesHistory, PeriodDate};

/// Group marked dates into cycles.
///
/// Dates are sorted and deduplicated first. A new cycle starts whenever a
/// date is more than one day after the previous one.
pub fn build_history<I>(marked_dates: I) -> CyclesHistory
where
    I: IntoIterator<Item = PeriodDate>,
{
    let mut days: Vec<PeriodDate> = marked_dates.into_iter().collect();
    days.sort();
    days.dedup();

    let mut runs: Vec<Vec<PeriodDate>> = Vec::new();
    for day in days {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|&prev| (day - prev).num_days() <= 1) => {
                run.push(day);
            }
            _ => runs.push(vec![day]),
        }
    }

    let starts: Vec<PeriodDate> = runs.iter().map(|r| r[0]).collect();
    let cycles = runs
        .into_iter()
        .enumerate()
        .map(|(i, period_dates)| Cycle {
            start_date: starts[i],
            cycle_length: starts
                .get(i + 1)
                .map(|next| (*next - starts[i]).num_days() as u32),
            period_dates,
        })
        .collect();

    CyclesHistory::from_cycles(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> Vec<NaiveDate> {
        let (start, end) = (d(start), d(end));
        start.iter_days().take_while(|day| *day <= end).collect()
    }

    #[test]
    fn empty_input_gives_empty_history() {
        let history = build_history(Vec::new());
        assert!(history.is_empty());
        assert!(history.last_period_days().is_empty());
    }

    #[test]
    fn single_run_is_one_open_cycle() {
        let history = build_history(range("2024-01-01", "2024-01-03"));
        assert_eq!(history.len(), 1);
        let cycle = &history[0];
        assert_eq!(cycle.start_date, d("2024-01-01"));
        assert_eq!(cycle.period_length(), 3);
        assert_eq!(cycle.cycle_length, None);
    }

    #[test]
    fn two_runs_give_cycle_length() {
        let mut dates = range("2024-01-01", "2024-01-03");
        dates.extend(range("2024-01-29", "2024-01-31"));
        let history = build_history(dates);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].cycle_length, Some(28));
        assert_eq!(history[1].start_date, d("2024-01-29"));
        assert_eq!(history[1].cycle_length, None);
        assert_eq!(
            history.last_period_days(),
            range("2024-01-29", "2024-01-31").as_slice()
        );
    }

    #[test]
    fn unordered_duplicates_are_normalised() {
        let history = build_history(vec![
            d("2024-03-02"),
            d("2024-03-01"),
            d("2024-03-02"),
            d("2024-02-01"),
        ]);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period_dates, vec![d("2024-02-01")]);
        assert_eq!(history[1].period_dates, vec![d("2024-03-01"), d("2024-03-02")]);
    }

    #[test]
    fn one_day_gap_splits_cycles() {
        // 2024-01-01 and 2024-01-03 are two days apart
        let history = build_history(vec![d("2024-01-01"), d("2024-01-03")]);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].cycle_length, Some(2));
    }

    #[test]
    fn recorded_lookup_spans_cycles() {
        let mut dates = range("2024-01-01", "2024-01-03");
        dates.extend(range("2024-01-29", "2024-01-31"));
        let history = build_history(dates);

        assert!(history.is_recorded(d("2024-01-02")));
        assert!(history.is_recorded(d("2024-01-31")));
        assert!(!history.is_recorded(d("2024-01-15")));
        assert!(!history.is_recorded(d("2023-12-31")));
    }

    fn date_set() -> impl Strategy<Value = BTreeSet<NaiveDate>> {
        prop::collection::btree_set(0i64..400, 0..60).prop_map(|offsets| {
            let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
            offsets
                .into_iter()
                .map(|o| base + Duration::days(o))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn partitions_input_exactly(dates in date_set()) {
            let history = build_history(dates.iter().copied());
            let flattened = history.period_dates();
            let unique: BTreeSet<NaiveDate> = flattened.iter().copied().collect();

            prop_assert_eq!(flattened.len(), unique.len());
            prop_assert_eq!(unique, dates);
        }

        #[test]
        fn rebuild_is_stable(dates in date_set()) {
            let history = build_history(dates);
            let rebuilt = build_history(history.period_dates());
            prop_assert_eq!(rebuilt, history);
        }

        #[test]
        fn runs_are_adjacent_and_separated(dates in date_set()) {
            let history = build_history(dates);
            for cycle in history.iter() {
                prop_assert_eq!(cycle.start_date, cycle.period_dates[0]);
                for pair in cycle.period_dates.windows(2) {
                    prop_assert_eq!((pair[1] - pair[0]).num_days(), 1);
                }
            }
            for pair in history.windows(2) {
                prop_assert!((pair[1].start_date - pair[0].end_date()).num_days() > 1);
                let expected = (pair[1].start_date - pair[0].start_date).num_days() as u32;
                prop_assert_eq!(pair[0].cycle_length, Some(expected));
            }
            if let Some(last) = history.latest() {
                prop_assert_eq!(last.cycle_length, None);
            }
        }
    }
}
