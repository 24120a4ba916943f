//! Interactive focus session.
//!
//! The timer ticks on the main thread at the configured interval. Commands
//! and attention-loss signals arrive over a channel from a reader thread
//! (piped lines, or terminal events from [`super::terminal`]), so they are
//! handled between ticks without polling.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use pomo_core::timer::format_clock;
use pomo_core::{
    Category, FocusController, PendingSummary, SessionSummary, SummaryKind, SystemClock,
    TimerStatus, Transition, User,
};
use pomo_db::{Database, LogChange};

use super::util::format_duration;

const HELP: &str = "\
Commands:
  p, pause     pause and show the session so far
  a, away      count a distraction and pause
  c, continue  start or resume the countdown
  f, finish    end now and record the time so far
  r, reset     discard the session
  s, status    show remaining time
  q, quit      discard the session and exit
  h, help      show this help
Switching away from the terminal or pressing Ctrl-Z counts as a distraction.";

/// Settings for one focus run.
#[derive(Debug, Clone, Copy)]
pub struct FocusOptions {
    pub minutes: u32,
    pub category: Category,
    pub tick_interval: Duration,
}

/// Something the session reacts to besides the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A typed command.
    Line(String),
    /// The terminal lost focus or the session was suspended.
    AttentionLost,
}

/// A line-oriented command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pause,
    Away,
    Continue,
    Finish,
    Reset,
    Status,
    Quit,
    Help,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::Pause),
            "a" | "away" => Some(Self::Away),
            "c" | "continue" | "start" => Some(Self::Continue),
            "f" | "finish" => Some(Self::Finish),
            "r" | "reset" => Some(Self::Reset),
            "s" | "status" => Some(Self::Status),
            "q" | "quit" => Some(Self::Quit),
            "h" | "help" | "?" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Whether the session loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

struct Session<'w, W> {
    writer: &'w mut W,
    controller: FocusController<Database, SystemClock>,
    changes: Receiver<LogChange>,
    user: User,
}

/// Runs a focus session for `user`, reading one command per line from `input`.
///
/// Returns the recorded summary, or `None` if the session was discarded.
pub fn run<R, W>(
    input: R,
    writer: &mut W,
    db: Database,
    user: User,
    options: FocusOptions,
) -> Result<Option<SessionSummary>>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    run_with_inputs(&spawn_reader(input), writer, db, user, options)
}

/// Runs a focus session fed by an arbitrary input channel.
///
/// The session ends early if the channel disconnects while not running.
pub fn run_with_inputs<W: Write>(
    inputs: &Receiver<Input>,
    writer: &mut W,
    mut db: Database,
    user: User,
    options: FocusOptions,
) -> Result<Option<SessionSummary>> {
    let changes = db.subscribe();
    let mut controller = FocusController::new(db, SystemClock, Some(user.id.clone()));
    let _ = controller.configure(options.minutes, options.category);
    let _ = controller.start();

    let mut session = Session {
        writer,
        controller,
        changes,
        user,
    };
    session.say(&format!(
        "Focusing on {} for {}. Type 'h' for commands.",
        options.category,
        format_clock(session.controller.timer().remaining_seconds())
    ))?;

    session.drive(inputs, options.tick_interval)
}

/// Forwards input lines over a channel until EOF or the receiver is gone.
fn spawn_reader<R: BufRead + Send + 'static>(input: R) -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(Input::Line(line)).is_err() {
                break;
            }
        }
    });
    rx
}

impl<W: Write> Session<'_, W> {
    fn drive(
        &mut self,
        inputs: &Receiver<Input>,
        interval: Duration,
    ) -> Result<Option<SessionSummary>> {
        let mut next_tick = Instant::now() + interval;
        let mut input_open = true;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            let event = if input_open {
                inputs.recv_timeout(wait)
            } else {
                thread::sleep(wait);
                Err(RecvTimeoutError::Timeout)
            };

            match event {
                Ok(Input::AttentionLost) => {
                    // Repeated signals while paused are dropped silently.
                    let _ = self.attention_lost()?;
                }
                Ok(Input::Line(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let Some(command) = Command::parse(&line) else {
                        self.say(&format!(
                            "Unknown command '{}'. Type 'h' for help.",
                            line.trim()
                        ))?;
                        continue;
                    };
                    let was_running = self.status() == TimerStatus::Running;
                    match self.handle(command)? {
                        (Flow::Exit, recorded) => return Ok(recorded),
                        (Flow::Continue, _) => {}
                    }
                    if !was_running && self.status() == TimerStatus::Running {
                        next_tick = Instant::now() + interval;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    next_tick += interval;
                    if let Some(recorded) = self.tick()? {
                        return Ok(Some(recorded));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    input_open = false;
                    if self.status() != TimerStatus::Running {
                        if self.status() == TimerStatus::Paused {
                            self.say("Input closed; discarding the paused session.")?;
                        }
                        let _ = self.controller.reset();
                        return Ok(None);
                    }
                    tracing::debug!("input closed, running to completion");
                }
            }
        }
    }

    fn status(&self) -> TimerStatus {
        self.controller.timer().status()
    }

    fn tick(&mut self) -> Result<Option<SessionSummary>> {
        match self.controller.tick()? {
            Transition::Finalized(summary) => {
                self.conclude()?;
                Ok(Some(summary))
            }
            Transition::Applied => {
                let remaining = self.controller.timer().remaining_seconds();
                if remaining % 60 == 0 {
                    self.say(&format!("{} left", format_clock(remaining)))?;
                }
                Ok(None)
            }
            Transition::Ignored => Ok(None),
        }
    }

    fn handle(&mut self, command: Command) -> Result<(Flow, Option<SessionSummary>)> {
        let transition = match command {
            Command::Pause => {
                let transition = self.controller.pause_manually();
                if !transition.is_ignored() {
                    self.show_pending()?;
                    let _ = self.controller.acknowledge_summary();
                    self.say("Paused. Type 'c' to continue or 'f' to finish.")?;
                }
                transition
            }
            Command::Away => self.attention_lost()?,
            Command::Continue => {
                let transition = self.controller.start();
                if !transition.is_ignored() {
                    self.say(&format!(
                        "Running, {} left.",
                        format_clock(self.controller.timer().remaining_seconds())
                    ))?;
                }
                transition
            }
            Command::Finish => {
                let transition = self.controller.finish_manually()?;
                if let Some(summary) = transition.finalized().copied() {
                    self.conclude()?;
                    return Ok((Flow::Exit, Some(summary)));
                }
                transition
            }
            Command::Reset => {
                let transition = self.controller.reset();
                self.say(&format!(
                    "Session discarded. Timer reset to {}; type 'c' to start again.",
                    format_clock(self.controller.timer().remaining_seconds())
                ))?;
                transition
            }
            Command::Status => {
                let timer = self.controller.timer();
                let line = format!(
                    "{:?}: {} of {} left, {} distraction(s).",
                    timer.status(),
                    format_clock(timer.remaining_seconds()),
                    format_clock(timer.configured_seconds()),
                    timer.distraction_count()
                );
                self.say(&line)?;
                Transition::Applied
            }
            Command::Quit => {
                if self.status() != TimerStatus::Idle {
                    self.say("Session discarded.")?;
                }
                let _ = self.controller.reset();
                return Ok((Flow::Exit, None));
            }
            Command::Help => {
                self.say(HELP)?;
                Transition::Applied
            }
        };

        if transition.is_ignored() {
            self.say(&format!("Not available while {:?}.", self.status()))?;
        }
        Ok((Flow::Continue, None))
    }

    /// Counts a distraction and pauses. Ignored unless running.
    fn attention_lost(&mut self) -> Result<Transition> {
        let transition = self.controller.report_attention_loss();
        if transition.is_ignored() {
            tracing::debug!(status = ?self.status(), "attention loss ignored");
        } else {
            self.say(&format!(
                "Distraction noted ({} so far). Paused; type 'c' to continue.",
                self.controller.timer().distraction_count()
            ))?;
        }
        Ok(transition)
    }

    /// Shows the final summary, acknowledges it and reports today's total.
    fn conclude(&mut self) -> Result<()> {
        self.show_pending()?;
        let _ = self.controller.acknowledge_summary();

        while let Ok(change) = self.changes.try_recv() {
            let LogChange::Appended { owner, .. } = change else {
                continue;
            };
            if owner == self.user.id {
                let today = self.controller.stats().today_total(&self.user.id)?;
                self.say(&format!("Focus time today: {}", format_duration(today)))?;
            }
        }
        Ok(())
    }

    fn show_pending(&mut self) -> Result<()> {
        let Some(pending) = self.controller.timer().pending_summary().copied() else {
            return Ok(());
        };
        self.say(&format_summary(&pending))
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

fn format_summary(pending: &PendingSummary) -> String {
    let heading = match pending.kind {
        SummaryKind::Completed => "Session complete.",
        SummaryKind::Finished => "Session finished early.",
        SummaryKind::Paused => "Session so far (not recorded yet):",
    };
    let summary = &pending.summary;
    format!(
        "{heading}\n  Category:     {}\n  Duration:     {}\n  Distractions: {}",
        summary.category,
        format_duration(u64::from(summary.duration_seconds)),
        summary.distraction_count
    )
}
