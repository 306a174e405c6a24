use std::io;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::RecvTimeoutError;
use tracing::{debug, info};

use crate::clock::SessionClock;
use crate::ledger::{LetterTypo, TypoLedger, WordTypo};
use crate::metrics::Timespan;
use crate::runtime::{CancelToken, ThokEventSource, ThokEvent, Ticker};
use crate::thok::{Keystroke, Thok};

/// How often the driver wakes to check for cancellation when no events arrive.
pub const POLL_RATE_MS: u64 = 100;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The countdown reached zero.
    Deadline,
    /// Stopped early by the player or the host.
    Cancelled,
}

/// Final numbers of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub cpm: f64,
    pub wpm: f64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub letters: TypoLedger<LetterTypo>,
    pub words: TypoLedger<WordTypo>,
    pub end: SessionEnd,
}

/// One timed typing session: the keystroke state machine plus the live
/// countdown, driven by events from a [`ThokEventSource`].
#[derive(Debug)]
pub struct Session {
    id: u64,
    timespan: Timespan,
    thok: Thok,
    remaining: u32,
    token: CancelToken,
}

impl Session {
    pub fn new(id: u64, thok: Thok, timespan: Timespan) -> Self {
        Self {
            id,
            timespan,
            thok,
            remaining: timespan.secs(),
            token: CancelToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn thok(&self) -> &Thok {
        &self.thok
    }

    pub fn timespan(&self) -> Timespan {
        self.timespan
    }

    /// Seconds left as last published by the clock.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Handle for cancelling the session from outside the event loop.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Apply one event. Returns why the session ended once it has.
    ///
    /// Keystrokes that arrive after cancellation was asserted are dropped
    /// unprocessed; the last fully processed keystroke is the last one counted.
    pub fn handle_event(&mut self, event: ThokEvent) -> Option<SessionEnd> {
        match event {
            ThokEvent::Tick { session, remaining } if session == self.id => {
                self.remaining = remaining;
            }
            ThokEvent::Deadline { session } if session == self.id => {
                self.remaining = 0;
            }
            ThokEvent::Tick { .. } | ThokEvent::Deadline { .. } => {
                debug!(session = self.id, ?event, "ignoring event from a stale clock");
            }
            ThokEvent::Resize => {}
            ThokEvent::Key(key) => {
                if self.token.is_cancelled() {
                    debug!(session = self.id, ?key, "dropping keystroke after cancellation");
                } else if is_abort(&key) {
                    self.token.cancel(SessionEnd::Cancelled);
                } else if let Some(stroke) = keystroke(&key) {
                    self.thok.apply(stroke);
                }
            }
        }

        self.token.reason()
    }

    /// Run the session to completion, calling `redraw` after every event
    /// that may have changed what is on screen.
    pub fn run<E, T, F>(mut self, events: &E, ticker: T, mut redraw: F) -> io::Result<SessionResult>
    where
        E: ThokEventSource,
        T: Ticker,
        F: FnMut(&Session) -> io::Result<()>,
    {
        info!(
            session = self.id,
            timespan = self.timespan.secs(),
            chars = self.thok.len(),
            "session started"
        );
        let clock =
            SessionClock::new(self.timespan, ticker).start(self.id, events.sender(), self.cancel_token());

        redraw(&self)?;
        let end = loop {
            let outcome = match events.recv_timeout(Duration::from_millis(POLL_RATE_MS)) {
                Ok(event) => {
                    let end = self.handle_event(event);
                    redraw(&self)?;
                    end
                }
                Err(RecvTimeoutError::Timeout) => self.token.reason(),
                Err(RecvTimeoutError::Disconnected) => {
                    self.token.cancel(SessionEnd::Cancelled);
                    self.token.reason()
                }
            };
            if let Some(end) = outcome {
                break end;
            }
        };
        clock.stop();

        let result = self.thok.finish(self.timespan, end);
        info!(
            session = self.id,
            ?end,
            cpm = result.cpm,
            wpm = result.wpm,
            correct = result.correct_count,
            wrong = result.wrong_count,
            "session finished"
        );
        Ok(result)
    }
}

fn is_abort(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Map a terminal key to a keystroke; anything but printable chars and
/// backspace is not part of the game.
fn keystroke(key: &KeyEvent) -> Option<Keystroke> {
    match key.code {
        KeyCode::Backspace => Some(Keystroke::Backspace),
        KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            None
        }
        KeyCode::Char(c) => Some(Keystroke::Char(c)),
        _ => None,
    }
}
