use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

use crate::session::SessionEnd;

/// Unified event type consumed by the app and the session driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThokEvent {
    Key(KeyEvent),
    Resize,
    /// Published by the session clock once per tick.
    Tick { session: u64, remaining: u32 },
    /// Published by the session clock when the countdown reaches zero.
    Deadline { session: u64 },
}

/// Source of events for the app runner
pub trait ThokEventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ThokEvent, RecvTimeoutError>;

    /// Handle used by background producers (the session clock) to publish events.
    fn sender(&self) -> Sender<ThokEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<ThokEvent>,
    rx: Receiver<ThokEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    key_tx.send(ThokEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => key_tx.send(ThokEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!(%err, "terminal event read failed, stopping input reader");
                    break;
                }
            };
            if forwarded.is_err() {
                debug!("event receiver dropped, stopping input reader");
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ThokEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ThokEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ThokEvent> {
        self.tx.clone()
    }
}

/// Channel-backed event source for tests and headless runs
pub struct TestEventSource {
    tx: Sender<ThokEvent>,
    rx: Receiver<ThokEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ThokEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ThokEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ThokEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One tick per wall-clock second.
    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

const ACTIVE: u8 = 0;
const DEADLINE: u8 = 1;
const CANCELLED: u8 = 2;

/// Cancellation signal shared by the session clock and the keystroke loop.
///
/// The first caller to cancel decides the reason; later calls are ignored.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicU8>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this call flipped the token.
    pub fn cancel(&self, reason: SessionEnd) -> bool {
        let code = match reason {
            SessionEnd::Deadline => DEADLINE,
            SessionEnd::Cancelled => CANCELLED,
        };
        self.0
            .compare_exchange(ACTIVE, code, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) != ACTIVE
    }

    pub fn reason(&self) -> Option<SessionEnd> {
        match self.0.load(Ordering::SeqCst) {
            DEADLINE => Some(SessionEnd::Deadline),
            CANCELLED => Some(SessionEnd::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn recv_times_out_without_events() {
        let es = TestEventSource::new();
        assert_eq!(
            es.recv_timeout(Duration::from_millis(1)),
            Err(RecvTimeoutError::Timeout)
        );
    }

    #[test]
    fn sender_feeds_the_source() {
        let es = TestEventSource::new();
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        es.sender().send(ThokEvent::Key(key)).unwrap();
        es.sender().send(ThokEvent::Resize).unwrap();

        assert_eq!(
            es.recv_timeout(Duration::from_millis(10)),
            Ok(ThokEvent::Key(key))
        );
        assert_eq!(
            es.recv_timeout(Duration::from_millis(10)),
            Ok(ThokEvent::Resize)
        );
    }

    #[test]
    fn fixed_ticker_interval() {
        assert_eq!(FixedTicker::seconds().interval(), Duration::from_secs(1));
        assert_eq!(
            FixedTicker::new(Duration::from_millis(5)).interval(),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn cancel_token_first_reason_wins() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.reason(), None);

        let shared = token.clone();
        assert!(shared.cancel(SessionEnd::Deadline));
        assert!(!token.cancel(SessionEnd::Cancelled));

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(SessionEnd::Deadline));
    }
}
