//! Cycle engine for an on-device period tracker.
//!
//! Marked period dates go in, a [`CyclesHistory`] comes out, and the rest of
//! the crate derives forecasts and edit checks from it. Everything except
//! [`storage`], [`config`] and [`state::Tracker`] is pure.

pub mod calendar;
pub mod config;
pub mod history;
pub mod locale;
pub mod models;
pub mod prediction;
pub mod state;
pub mod storage;
pub mod validation;

pub use history::build_history;
pub use models::{Cycle, CyclesHistory, PeriodDate};
pub use state::{Action, CycleState, Tracker};
