use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::metrics::Timespan;
use crate::runtime::{CancelToken, ThokEvent, Ticker};
use crate::session::SessionEnd;

/// Countdown for one session, run on its own thread.
pub struct SessionClock<T: Ticker> {
    timespan: Timespan,
    ticker: T,
}

/// Running clock. Dropping it stops the countdown at the next wakeup.
pub struct ClockHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Ticker> SessionClock<T> {
    pub fn new(timespan: Timespan, ticker: T) -> Self {
        Self { timespan, ticker }
    }

    /// Start counting down. Publishes `Tick` with the remaining seconds before
    /// every wait and `Deadline` once the countdown reaches zero, cancelling
    /// `token` first. Exits quietly if the token is cancelled by someone else.
    pub fn start(self, session: u64, tx: Sender<ThokEvent>, token: CancelToken) -> ClockHandle {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.ticker.interval();
        let mut remaining = self.timespan.secs();

        let thread = thread::spawn(move || {
            loop {
                if token.is_cancelled() {
                    debug!(session, remaining, "clock observed cancellation");
                    return;
                }
                if tx.send(ThokEvent::Tick { session, remaining }).is_err() {
                    return;
                }

                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }

                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }

            if token.cancel(SessionEnd::Deadline) {
                debug!(session, "session deadline reached");
                let _ = tx.send(ThokEvent::Deadline { session });
            }
        });

        ClockHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        }
    }
}

impl ClockHandle {
    /// Stop the countdown and wait for the clock thread to exit.
    pub fn stop(mut self) {
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.stop.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FixedTicker;
    use std::time::Duration;

    fn ticks(secs: u32) -> (Vec<ThokEvent>, CancelToken) {
        let (tx, rx) = mpsc::channel();
        let token = CancelToken::new();
        let clock = SessionClock::new(
            Timespan::from_secs(secs).unwrap(),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let handle = clock.start(7, tx, token.clone());

        let mut events = Vec::new();
        while let Ok(ev) = rx.recv_timeout(Duration::from_secs(2)) {
            let done = matches!(ev, ThokEvent::Deadline { .. });
            events.push(ev);
            if done {
                break;
            }
        }
        handle.stop();
        (events, token)
    }

    #[test]
    fn counts_down_then_fires_deadline() {
        let (events, token) = ticks(3);

        assert_eq!(
            events,
            vec![
                ThokEvent::Tick {
                    session: 7,
                    remaining: 3
                },
                ThokEvent::Tick {
                    session: 7,
                    remaining: 2
                },
                ThokEvent::Tick {
                    session: 7,
                    remaining: 1
                },
                ThokEvent::Deadline { session: 7 },
            ]
        );
        assert_eq!(token.reason(), Some(SessionEnd::Deadline));
    }

    #[test]
    fn external_cancellation_suppresses_deadline() {
        let (tx, rx) = mpsc::channel();
        let token = CancelToken::new();
        token.cancel(SessionEnd::Cancelled);

        let clock = SessionClock::new(
            Timespan::from_secs(1).unwrap(),
            FixedTicker::new(Duration::from_millis(1)),
        );
        clock.start(1, tx, token.clone()).stop();

        assert!(rx.try_iter().next().is_none());
        assert_eq!(token.reason(), Some(SessionEnd::Cancelled));
    }

    #[test]
    fn stop_interrupts_a_long_tick() {
        let (tx, rx) = mpsc::channel();
        let token = CancelToken::new();
        let clock = SessionClock::new(
            Timespan::from_secs(120).unwrap(),
            FixedTicker::new(Duration::from_secs(60)),
        );
        let handle = clock.start(1, tx, token.clone());

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)),
            Ok(ThokEvent::Tick {
                session: 1,
                remaining: 120
            })
        );
        // returns promptly instead of waiting out the minute
        handle.stop();
        assert!(!token.is_cancelled());
    }
}
