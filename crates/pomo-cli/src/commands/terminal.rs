//! Interactive terminal input for `pomo focus`.
//!
//! When stdin is a terminal, the session runs in raw mode with focus
//! reporting enabled. Each key press is a one-key command, and losing
//! terminal focus or pressing Ctrl-Z reports attention loss.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::focus::Input;

/// Raw mode plus focus reporting, restored on drop.
pub struct TerminalGuard(());

impl TerminalGuard {
    pub fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        if let Err(e) = execute!(io::stdout(), EnableFocusChange) {
            disable_raw_mode().ok();
            return Err(e).context("failed to enable focus reporting");
        }
        Ok(Self(()))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        execute!(io::stdout(), DisableFocusChange).ok();
        disable_raw_mode().ok();
    }
}

/// Maps a terminal event to a session input.
pub fn input_from_event(event: &Event) -> Option<Input> {
    match event {
        Event::FocusLost => Some(Input::AttentionLost),
        Event::Key(key) => input_from_key(key),
        _ => None,
    }
}

fn input_from_key(key: &KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Raw mode turns Ctrl-C and Ctrl-Z into plain key events
        return match key.code {
            KeyCode::Char('c') => Some(Input::Line("q".to_string())),
            KeyCode::Char('z') => Some(Input::AttentionLost),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(c) => Some(Input::Line(c.to_string())),
        KeyCode::Esc => Some(Input::Line("q".to_string())),
        _ => None,
    }
}

/// Forwards terminal events over a channel until reading fails or the
/// receiver is gone.
pub fn spawn_events() -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::debug!(error = %e, "terminal event read failed");
                    break;
                }
            };
            let Some(input) = input_from_event(&event) else {
                continue;
            };
            if tx.send(input).is_err() {
                break;
            }
        }
    });
    rx
}

/// Writer that emits `\r\n` for `\n`, as raw mode no longer does.
pub struct RawLines<W>(pub W);

impl<W: Write> Write for RawLines<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.split_inclusive(|&b| b == b'\n') {
            match chunk.split_last() {
                Some((b'\n', line)) => {
                    self.0.write_all(line)?;
                    self.0.write_all(b"\r\n")?;
                }
                _ => self.0.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
