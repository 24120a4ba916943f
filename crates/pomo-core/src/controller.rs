//! Persisting wrapper around [`FocusTimer`].

use thiserror::Error;

use crate::clock::Clock;
use crate::stats::Aggregator;
use crate::store::SessionLog;
use crate::timer::{FocusTimer, Transition};
use crate::types::{Category, NewSessionRecord, SessionRecord, UserId};

/// Errors from controller operations that are refused outright.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The owner cannot change while a run or its summary is pending.
    #[error("a focus session is in progress; finish or reset it before switching user")]
    SessionInFlight,
}

/// Drives one [`FocusTimer`] for one owner and records finalized sessions.
///
/// The owner is injected at construction and only changes through
/// [`switch_owner`](Self::switch_owner). Without an owner, finalized sessions
/// still produce a summary but are not written.
#[derive(Debug)]
pub struct FocusController<L, C> {
    timer: FocusTimer,
    owner: Option<UserId>,
    log: L,
    clock: C,
}

impl<L: SessionLog, C: Clock> FocusController<L, C> {
    pub fn new(log: L, clock: C, owner: Option<UserId>) -> Self {
        Self {
            timer: FocusTimer::default(),
            owner,
            log,
            clock,
        }
    }

    pub const fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub const fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    /// Statistics over the same log, dated by the same clock.
    pub const fn stats(&self) -> Aggregator<'_, L, &C> {
        Aggregator::new(&self.log, &self.clock)
    }

    /// Changes the owning identity.
    ///
    /// Refused while a run is in flight or a summary awaits acknowledgment.
    pub fn switch_owner(&mut self, owner: Option<UserId>) -> Result<(), TimerError> {
        if !self.timer.can_switch_owner() {
            return Err(TimerError::SessionInFlight);
        }
        tracing::debug!(from = ?self.owner, to = ?owner, "switching owner");
        self.owner = owner;
        Ok(())
    }

    pub fn configure(&mut self, minutes: u32, category: Category) -> Transition {
        self.timer.configure(minutes, category)
    }

    pub fn start(&mut self) -> Transition {
        self.timer.start()
    }

    /// Advances the countdown, recording the session if it completes.
    ///
    /// A store failure is returned after the timer has already moved to its
    /// summary; the run is not retried.
    pub fn tick(&mut self) -> Result<Transition, L::Error> {
        let transition = self.timer.tick();
        self.record(transition)?;
        Ok(transition)
    }

    pub fn report_attention_loss(&mut self) -> Transition {
        self.timer.report_attention_loss()
    }

    pub fn pause_manually(&mut self) -> Transition {
        self.timer.pause_manually()
    }

    pub fn finish_manually(&mut self) -> Result<Transition, L::Error> {
        let transition = self.timer.finish_manually();
        self.record(transition)?;
        Ok(transition)
    }

    pub fn reset(&mut self) -> Transition {
        self.timer.reset()
    }

    pub fn acknowledge_summary(&mut self) -> Transition {
        self.timer.acknowledge_summary()
    }

    fn record(&mut self, transition: Transition) -> Result<Option<SessionRecord>, L::Error> {
        let Transition::Finalized(summary) = transition else {
            return Ok(None);
        };
        let Some(owner) = &self.owner else {
            tracing::warn!(?summary, "no active owner, session not recorded");
            return Ok(None);
        };
        let record = NewSessionRecord {
            owner_id: owner.clone(),
            date: self.clock.today(),
            summary,
        };
        let stored = self.log.insert_session_record(&record)?;
        tracing::info!(
            id = %stored.id,
            category = %stored.category,
            duration_seconds = stored.duration_seconds,
            distractions = stored.distraction_count,
            "session recorded"
        );
        Ok(Some(stored))
    }
}
