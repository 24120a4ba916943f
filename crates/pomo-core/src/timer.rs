//! Focus session state machine.
//!
//! [`FocusTimer`] owns one timed run: countdown, pause on attention loss,
//! manual pause/finish, and the summary shown when a run ends. It never
//! touches storage. Operations that end a run in a way that must be recorded
//! return [`Transition::Finalized`]; the caller (normally
//! [`FocusController`](crate::FocusController)) persists it.
//!
//! ```text
//! Idle ──start──▶ Running ──attention loss──▶ Paused ──start──▶ Running
//!                   │  │                         │
//!                   │  └──pause──▶ Awaiting ─ack─┘ (back to Paused)
//!                   └──finish / tick to 0──▶ Awaiting ─ack─▶ Idle
//! ```
//!
//! Every operation is a no-op returning [`Transition::Ignored`] when the
//! current status does not allow it.

use serde::Serialize;

use crate::types::{Category, SessionSummary};

/// Default run length in minutes.
pub const DEFAULT_MINUTES: u32 = 25;

/// Shortest run length accepted by [`FocusTimer::configure`].
pub const MIN_MINUTES: u32 = 1;

/// Lifecycle status of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// Configured, not started.
    Idle,
    Running,
    Paused,
    /// A summary is on screen and must be acknowledged.
    AwaitingAcknowledgment,
}

/// Why a summary is pending, which decides where acknowledgment leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// The countdown reached zero.
    Completed,
    /// The user finished early.
    Finished,
    /// The user paused; nothing was recorded.
    Paused,
}

impl SummaryKind {
    /// Whether the summary describes a recorded session.
    pub const fn is_recorded(self) -> bool {
        matches!(self, Self::Completed | Self::Finished)
    }
}

/// A summary awaiting acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
    pub kind: SummaryKind,
    #[serde(flatten)]
    pub summary: SessionSummary,
}

/// Result of applying one operation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The operation is not allowed in the current status; nothing changed.
    Ignored,
    /// State changed; nothing to record.
    Applied,
    /// The run ended and this summary must be recorded.
    Finalized(SessionSummary),
}

impl Transition {
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub const fn finalized(&self) -> Option<&SessionSummary> {
        match self {
            Self::Finalized(summary) => Some(summary),
            Self::Ignored | Self::Applied => None,
        }
    }
}

/// Observable state, as consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub remaining_seconds: u32,
    pub configured_seconds: u32,
    pub category: Category,
    pub distraction_count: u32,
    pub summary: Option<PendingSummary>,
}

/// The focus session state machine.
#[derive(Debug, Clone)]
pub struct FocusTimer {
    configured_seconds: u32,
    remaining_seconds: u32,
    category: Category,
    distraction_count: u32,
    status: TimerStatus,
    pending: Option<PendingSummary>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES, Category::default())
    }
}

impl FocusTimer {
    /// Creates an idle timer configured for `minutes` (at least one).
    pub fn new(minutes: u32, category: Category) -> Self {
        let configured_seconds = minutes_to_seconds(minutes);
        Self {
            configured_seconds,
            remaining_seconds: configured_seconds,
            category,
            distraction_count: 0,
            status: TimerStatus::Idle,
            pending: None,
        }
    }

    pub const fn status(&self) -> TimerStatus {
        self.status
    }

    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub const fn configured_seconds(&self) -> u32 {
        self.configured_seconds
    }

    /// Focus time accumulated so far in this run.
    pub const fn elapsed_seconds(&self) -> u32 {
        self.configured_seconds - self.remaining_seconds
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub const fn distraction_count(&self) -> u32 {
        self.distraction_count
    }

    pub const fn pending_summary(&self) -> Option<&PendingSummary> {
        self.pending.as_ref()
    }

    /// Whether the owning identity may be switched away from this timer.
    ///
    /// False while a run is in flight or a summary is unacknowledged.
    pub fn can_switch_owner(&self) -> bool {
        self.status == TimerStatus::Idle
    }

    pub const fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            remaining_seconds: self.remaining_seconds,
            configured_seconds: self.configured_seconds,
            category: self.category,
            distraction_count: self.distraction_count,
            summary: self.pending,
        }
    }

    /// Sets duration and category. Only allowed while idle.
    ///
    /// Durations below [`MIN_MINUTES`] are raised to it.
    pub fn configure(&mut self, minutes: u32, category: Category) -> Transition {
        if self.status != TimerStatus::Idle {
            tracing::debug!(status = ?self.status, "configure ignored");
            return Transition::Ignored;
        }
        if minutes < MIN_MINUTES {
            tracing::debug!(minutes, "duration coerced to minimum");
        }
        self.configured_seconds = minutes_to_seconds(minutes);
        self.remaining_seconds = self.configured_seconds;
        self.category = category;
        self.distraction_count = 0;
        Transition::Applied
    }

    /// Starts an idle run or resumes a paused one.
    pub fn start(&mut self) -> Transition {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                Transition::Applied
            }
            TimerStatus::Running | TimerStatus::AwaitingAcknowledgment => Transition::Ignored,
        }
    }

    /// One-second clock event.
    pub fn tick(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Transition::Applied;
        }
        let summary = self.conclude(SummaryKind::Completed);
        tracing::debug!(?summary, "session completed");
        Transition::Finalized(summary)
    }

    /// The user stopped paying attention: count a distraction and pause.
    ///
    /// Ignored unless running, so near-simultaneous signals count once.
    pub fn report_attention_loss(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::Ignored;
        }
        self.distraction_count += 1;
        self.status = TimerStatus::Paused;
        tracing::debug!(distractions = self.distraction_count, "attention lost");
        Transition::Applied
    }

    /// Pauses and shows an in-progress summary without recording it.
    pub fn pause_manually(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::Ignored;
        }
        self.conclude(SummaryKind::Paused);
        Transition::Applied
    }

    /// Ends the run early, recording the time accumulated so far.
    pub fn finish_manually(&mut self) -> Transition {
        match self.status {
            TimerStatus::Running | TimerStatus::Paused => {
                let summary = self.conclude(SummaryKind::Finished);
                tracing::debug!(?summary, "session finished early");
                Transition::Finalized(summary)
            }
            TimerStatus::Idle | TimerStatus::AwaitingAcknowledgment => Transition::Ignored,
        }
    }

    /// Discards the run and returns to idle. Always succeeds.
    pub fn reset(&mut self) -> Transition {
        self.remaining_seconds = self.configured_seconds;
        self.distraction_count = 0;
        self.pending = None;
        self.status = TimerStatus::Idle;
        Transition::Applied
    }

    /// Dismisses the pending summary.
    ///
    /// Recorded sessions reset the timer; a pause summary leaves it paused.
    pub fn acknowledge_summary(&mut self) -> Transition {
        let Some(pending) = self.pending.take() else {
            return Transition::Ignored;
        };
        if pending.kind.is_recorded() {
            self.reset()
        } else {
            self.status = TimerStatus::Paused;
            Transition::Applied
        }
    }

    fn conclude(&mut self, kind: SummaryKind) -> SessionSummary {
        let summary = SessionSummary {
            category: self.category,
            duration_seconds: self.elapsed_seconds(),
            distraction_count: self.distraction_count,
        };
        self.pending = Some(PendingSummary { kind, summary });
        self.status = TimerStatus::AwaitingAcknowledgment;
        summary
    }
}

fn minutes_to_seconds(minutes: u32) -> u32 {
    minutes.max(MIN_MINUTES).saturating_mul(60)
}

/// Formats seconds as `M:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
