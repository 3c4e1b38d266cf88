//! Core domain logic for search path analysis.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: deciding which history events are searches
//! - Calendar windows: slicing classified history by week, month or in full
//! - Ranking: ordering search systems by share of use

pub mod calendar;
mod classify;
pub mod cleanup;
pub mod event;
pub mod inspect;
pub mod label;
mod rank;
pub mod rolling;
pub mod rules;
pub mod time;

pub use calendar::{
    PeriodKind, Window, WindowError, full_history, total_windows, window_by_month, window_by_week,
};
pub use classify::{
    ClassifierConfig, DEFAULT_ROLLING_WINDOW, QUERY_PLACEHOLDER, classify, classify_with,
};
pub use cleanup::{CleanupHandler, CleanupVerdict};
pub use event::{AnnotatedEvent, Event, EventError, RawVisit, resolve_events};
pub use inspect::{QueryCount, find_by_local_time, query_counts, surrounding};
pub use label::{SearchLabel, UnknownSearchLabel};
pub use rank::{EngineCount, RankedSummary, rank};
pub use rules::{CleanupRule, PrefixRule, RuleError, RuleSet};
