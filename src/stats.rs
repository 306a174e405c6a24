use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ledger::{LetterTypo, TypoLedger, WordTypo};
use crate::session::SessionResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Mean speed over all stored sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub cpm: f64,
    pub wpm: f64,
}

/// Everything the statistics file says about past sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalStatistics {
    pub letters: TypoLedger<LetterTypo>,
    pub words: TypoLedger<WordTypo>,
    pub sessions_played: u32,
    pub last_played: Option<String>,
    cpm_sum: f64,
    wpm_sum: f64,
    summaries: u32,
}

impl HistoricalStatistics {
    /// Average cpm/wpm, or `None` when no session summary was ever stored.
    pub fn averages(&self) -> Option<Averages> {
        if self.summaries == 0 {
            return None;
        }
        let n = self.summaries as f64;
        Some(Averages {
            cpm: self.cpm_sum / n,
            wpm: self.wpm_sum / n,
        })
    }

    pub fn summaries(&self) -> u32 {
        self.summaries
    }

    /// Fold a finished session in, as if it had been loaded from disk.
    pub fn merge_session(&mut self, result: &SessionResult) {
        self.letters.merge(&result.letters);
        self.words.merge(&result.words);
        self.add_speed(result.cpm, result.wpm);
    }

    fn add_speed(&mut self, cpm: f64, wpm: f64) {
        self.cpm_sum += cpm;
        self.wpm_sum += wpm;
        self.summaries += 1;
    }

    /// Merge one line of the statistics file. Returns false if the line was
    /// not understood.
    fn merge_line(&mut self, line: &str) -> bool {
        let Some((tag, rest)) = line.split_once(';') else {
            return false;
        };

        match tag {
            "Played" => {
                self.sessions_played += 1;
                self.last_played = Some(rest.to_string());
                true
            }
            "Letter" => match parse_letter(rest) {
                Some((key, count)) => {
                    self.letters.record(key, count);
                    true
                }
                None => false,
            },
            "Word" => match parse_word(rest) {
                Some((key, count)) => {
                    self.words.record(key, count);
                    true
                }
                None => false,
            },
            "cpm" => match parse_summary(rest) {
                Some((cpm, wpm)) => {
                    self.add_speed(cpm, wpm);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

// `<key>;Count;<n>;Finger;<name>`. The key may itself be `;`, so split from the right.
fn parse_letter(rest: &str) -> Option<(&str, u32)> {
    let mut fields = rest.rsplitn(5, ';');
    let _finger = fields.next()?;
    (fields.next()? == "Finger").then_some(())?;
    let count = fields.next()?.parse().ok()?;
    (fields.next()? == "Count").then_some(())?;
    let key = fields.next()?;
    (!key.is_empty()).then_some((key, count))
}

// `<word>;Count;<n>`
fn parse_word(rest: &str) -> Option<(&str, u32)> {
    let mut fields = rest.rsplitn(3, ';');
    let count = fields.next()?.parse().ok()?;
    (fields.next()? == "Count").then_some(())?;
    let key = fields.next()?;
    (!key.is_empty()).then_some((key, count))
}

// `<cpm>;wpm;<wpm>;correctChars;<n>;wrongChars;<n>`; only the speeds matter here.
fn parse_summary(rest: &str) -> Option<(f64, f64)> {
    let fields: Vec<&str> = rest.split(';').collect();
    match fields.as_slice() {
        [cpm, "wpm", wpm, ..] => Some((cpm.parse().ok()?, wpm.parse().ok()?)),
        _ => None,
    }
}

/// Append-only statistics file.
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and merge the whole history. A missing file is created empty and
    /// read as no history; lines that cannot be parsed are skipped.
    pub fn load(&self) -> Result<HistoricalStatistics> {
        let mut history = HistoricalStatistics::default();

        if !self.path.exists() {
            info!(path = %self.path.display(), "no statistics yet, creating empty file");
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            return Ok(history);
        }

        let contents = fs::read_to_string(&self.path)?;
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if !history.merge_line(line) {
                warn!(line = idx + 1, content = line, "skipping unreadable statistics line");
            }
        }

        debug!(
            sessions = history.sessions_played,
            letters = history.letters.len(),
            words = history.words.len(),
            "statistics loaded"
        );
        Ok(history)
    }

    pub fn append(&self, result: &SessionResult) -> Result<()> {
        self.append_at(result, Local::now())
    }

    /// Write one session block stamped with `played_at`.
    pub fn append_at(&self, result: &SessionResult, played_at: DateTime<Local>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "Played;{}", played_at.format(TIMESTAMP_FORMAT))?;
        for record in result.letters.iter() {
            writeln!(out, "{record}")?;
        }
        for record in result.words.iter() {
            writeln!(out, "{record}")?;
        }
        writeln!(
            out,
            "cpm;{};wpm;{};correctChars;{};wrongChars;{}",
            result.cpm, result.wpm, result.correct_count, result.wrong_count
        )?;
        out.flush()?;

        info!(path = %self.path.display(), "session statistics saved");
        Ok(())
    }
}
