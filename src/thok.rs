use crate::ledger::{LetterTypo, TypoLedger, WordTypo};
use crate::metrics::{Speed, Timespan};
use crate::session::{SessionEnd, SessionResult};

/// One key press fed into the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
}

/// How a keystroke was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    Backspace,
    Ignored,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Index of the next character to be judged.
    pub position: usize,
    pub has_active_error: bool,
}

/// A character currently shown as wrong and not yet erased.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingError {
    pub position: usize,
    pub typed: char,
}

/// What to draw for one character of the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Typed(char),
    Wrong(char),
    Cursor { expected: char, errored: bool },
    Untyped(char),
}

/// A word, or the single space separating two words. `end` is the char
/// offset just past it.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    end: usize,
    word: Option<String>,
}

/// represents a typing test in progress
#[derive(Debug, Clone)]
pub struct Thok {
    prompt: String,
    chars: Vec<char>,
    tokens: Vec<Token>,
    token_idx: usize,
    cursor: CursorState,
    pending: Vec<PendingError>,
    correct_count: u32,
    wrong_count: u32,
    letters: TypoLedger<LetterTypo>,
    words: TypoLedger<WordTypo>,
}

impl Thok {
    /// Build a test from a word list. Words are joined with single spaces;
    /// empty words are dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chars = Vec::new();
        let mut tokens = Vec::new();

        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !tokens.is_empty() {
                tokens.push(Token {
                    end: chars.len() + 1,
                    word: None,
                });
                chars.push(' ');
            }
            chars.extend(word.chars());
            tokens.push(Token {
                end: chars.len(),
                word: Some(word.to_string()),
            });
        }

        Self {
            prompt: chars.iter().collect(),
            chars,
            tokens,
            token_idx: 0,
            cursor: CursorState::default(),
            pending: Vec::new(),
            correct_count: 0,
            wrong_count: 0,
            letters: TypoLedger::new(),
            words: TypoLedger::new(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Prompt length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn pending_errors(&self) -> &[PendingError] {
        &self.pending
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    pub fn letter_typos(&self) -> &TypoLedger<LetterTypo> {
        &self.letters
    }

    pub fn word_typos(&self) -> &TypoLedger<WordTypo> {
        &self.words
    }

    /// The word under the cursor, or `None` while on a separator.
    pub fn current_word(&self) -> Option<&str> {
        self.tokens
            .get(self.token_idx)
            .and_then(|t| t.word.as_deref())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.position >= self.chars.len()
    }

    pub fn apply(&mut self, key: Keystroke) -> Outcome {
        match key {
            Keystroke::Backspace => self.backspace(),
            Keystroke::Char(c) => self.write(c),
        }
    }

    pub fn backspace(&mut self) -> Outcome {
        if self.cursor.position == 0 {
            return Outcome::Ignored;
        }

        self.cursor.position -= 1;
        if self
            .pending
            .last()
            .is_some_and(|p| p.position == self.cursor.position)
        {
            self.pending.pop();
            if self.pending.is_empty() {
                self.cursor.has_active_error = false;
            }
        }
        self.sync_token();

        Outcome::Backspace
    }

    pub fn write(&mut self, c: char) -> Outcome {
        let position = self.cursor.position;
        let Some(&expected) = self.chars.get(position) else {
            return Outcome::Ignored;
        };

        let outcome = if !self.cursor.has_active_error && c == expected {
            self.correct_count += 1;
            Outcome::Correct
        } else {
            self.cursor.has_active_error = true;
            if self.pending.last().map(|p| p.position) != Some(position) {
                self.pending.push(PendingError { position, typed: c });
            }

            self.letters.record(c.encode_utf8(&mut [0; 4]), 1);
            if let Some(word) = self
                .tokens
                .get(self.token_idx)
                .and_then(|t| t.word.as_deref())
            {
                self.words.record(word, 1);
            }
            self.wrong_count += 1;
            Outcome::Incorrect
        };

        self.cursor.position += 1;
        self.advance_token();

        outcome
    }

    fn advance_token(&mut self) {
        if let Some(token) = self.tokens.get(self.token_idx) {
            if self.cursor.position >= token.end && self.token_idx + 1 < self.tokens.len() {
                self.token_idx += 1;
            }
        }
    }

    // Backspace can step back over a word boundary.
    fn sync_token(&mut self) {
        let position = self.cursor.position;
        self.token_idx = self
            .tokens
            .iter()
            .position(|t| position < t.end)
            .unwrap_or(self.tokens.len().saturating_sub(1));
    }

    /// Render-ready view of every prompt character.
    pub fn glyphs(&self) -> Vec<Glyph> {
        let mut pending = self.pending.iter().peekable();

        self.chars
            .iter()
            .enumerate()
            .map(|(idx, &expected)| {
                if let Some(err) = pending.next_if(|p| p.position == idx) {
                    return Glyph::Wrong(err.typed);
                }
                match idx.cmp(&self.cursor.position) {
                    std::cmp::Ordering::Less => Glyph::Typed(expected),
                    std::cmp::Ordering::Equal => Glyph::Cursor {
                        expected,
                        errored: self.cursor.has_active_error,
                    },
                    std::cmp::Ordering::Greater => Glyph::Untyped(expected),
                }
            })
            .collect()
    }

    /// Freeze the counters into a result over the configured duration.
    pub fn finish(self, timespan: Timespan, end: SessionEnd) -> SessionResult {
        let speed = Speed::compute(self.correct_count, timespan);

        SessionResult {
            cpm: speed.cpm,
            wpm: speed.wpm,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            letters: self.letters,
            words: self.words,
            end,
        }
    }
}

#[cfg(test)]
mod proptest_thok;
