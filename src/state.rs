use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::history::build_history;
use crate::models::CyclesHistory;
use crate::storage::{MarkedDatesStore, StorageError};
use crate::validation::{self, EditError, FillPolicy};

/// An edit to the set of marked dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace every marked date, e.g. after saving an editing calendar.
    Replace(BTreeSet<NaiveDate>),
    /// One-tap "period started today".
    MarkToday,
    Add(BTreeSet<NaiveDate>),
    Remove(BTreeSet<NaiveDate>),
    Clear,
}

/// The current cycle history. Edits produce a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleState {
    history: CyclesHistory,
}

impl CycleState {
    pub fn from_marked_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            history: build_history(dates),
        }
    }

    pub fn history(&self) -> &CyclesHistory {
        &self.history
    }

    pub fn marked_dates(&self) -> BTreeSet<NaiveDate> {
        self.history.period_dates().into_iter().collect()
    }

    /// Apply an edit and return the resulting state.
    pub fn apply(
        &self,
        action: Action,
        today: NaiveDate,
        policy: FillPolicy,
    ) -> Result<CycleState, EditError> {
        let marked = match action {
            Action::Replace(dates) => dates,
            Action::MarkToday => {
                if validation::is_period_today(&self.history, today) {
                    return Err(EditError::AlreadyMarked { date: today });
                }
                let mut marked = self.marked_dates();
                marked.extend(validation::past_future_fill_days(&self.history, today, policy));
                marked
            }
            Action::Add(dates) => {
                let mut marked = self.marked_dates();
                marked.extend(dates);
                marked
            }
            Action::Remove(dates) => {
                let mut marked = self.marked_dates();
                marked.retain(|date| !dates.contains(date));
                marked
            }
            Action::Clear => BTreeSet::new(),
        };

        validation::validate_edit(&marked, today)?;
        Ok(Self::from_marked_dates(marked))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A [`CycleState`] backed by a store. Every accepted edit is saved before
/// the in-memory state is replaced.
pub struct Tracker<S> {
    store: S,
    policy: FillPolicy,
    state: CycleState,
}

impl<S: MarkedDatesStore> Tracker<S> {
    /// Load saved dates. A store with nothing saved yields an empty history.
    pub fn open(store: S, policy: FillPolicy) -> Result<Self, TrackerError> {
        let state = match store.load_marked_dates()? {
            Some(dates) => CycleState::from_marked_dates(dates),
            None => {
                tracing::info!("no saved cycles, starting a new history");
                CycleState::default()
            }
        };
        Ok(Self {
            store,
            policy,
            state,
        })
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn history(&self) -> &CyclesHistory {
        self.state.history()
    }

    pub fn dispatch(
        &mut self,
        action: Action,
        today: NaiveDate,
    ) -> Result<&CycleState, TrackerError> {
        let next = match self.state.apply(action, today, self.policy) {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!(error = %e, "edit rejected");
                return Err(e.into());
            }
        };

        self.store.save_marked_dates(&next.marked_dates())?;
        tracing::debug!(cycles = next.history().len(), "cycles updated");
        self.state = next;
        Ok(&self.state)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
