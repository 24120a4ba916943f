//! Core domain logic for the focus timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the focus session state machine
//! - Controller: recording finalized sessions for an explicit owner
//! - Stats: daily, all-time, distraction, trend and category aggregates
//! - Store: the session log contract and an in-memory implementation

mod clock;
mod controller;
pub mod stats;
mod store;
pub mod timer;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{FocusController, TimerError};
pub use stats::{Aggregator, CategoryTotal, DailyTotal, StatsSnapshot};
pub use store::{MemoryLog, SessionLog};
pub use timer::{FocusTimer, PendingSummary, SummaryKind, TimerSnapshot, TimerStatus, Transition};
pub use types::{
    Category, NewSessionRecord, SessionId, SessionRecord, SessionSummary, User, UserId,
    ValidationError,
};
