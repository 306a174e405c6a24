use crate::error::{Error, Result};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Configured session length. Never zero, so speed metrics are always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timespan(NonZeroU32);

impl Timespan {
    /// Durations offered by the settings menu.
    pub const CHOICES: [u32; 3] = [30, 60, 120];

    pub fn from_secs(secs: u32) -> Result<Self> {
        NonZeroU32::new(secs)
            .map(Timespan)
            .ok_or(Error::InvalidTimespan(secs))
    }

    pub fn secs(&self) -> u32 {
        self.0.get()
    }

    pub fn minutes(&self) -> f64 {
        self.secs() as f64 / 60.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs() as u64)
    }
}

const DEFAULT_SECS: NonZeroU32 = match NonZeroU32::new(30) {
    Some(secs) => secs,
    None => panic!("default session length must be non-zero"),
};

impl Default for Timespan {
    fn default() -> Self {
        Timespan(DEFAULT_SECS)
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

impl FromStr for Timespan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let secs = s
            .trim_end_matches('s')
            .parse::<u32>()
            .map_err(|e| format!("not a number of seconds: {e}"))?;
        Timespan::from_secs(secs).map_err(|e| e.to_string())
    }
}

/// Speed over the configured session length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed {
    pub cpm: f64,
    pub wpm: f64,
}

impl Speed {
    /// Characters per minute and whole words (5 chars) per minute.
    pub fn compute(correct_chars: u32, timespan: Timespan) -> Self {
        let minutes = timespan.minutes();
        let correct = correct_chars as f64;

        Self {
            cpm: correct / minutes,
            wpm: (correct / 5.0 / minutes).floor(),
        }
    }
}
