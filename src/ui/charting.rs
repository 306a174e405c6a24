use ratatui::style::Color;

use crate::ledger::{LetterTypo, TypoLedger, WordTypo};

/// Bar colours, cycled in order.
pub const PALETTE: [Color; 5] = [
    Color::Rgb(3, 166, 150),
    Color::Rgb(242, 146, 29),
    Color::Rgb(217, 208, 197),
    Color::Rgb(166, 149, 134),
    Color::Rgb(242, 100, 48),
];

/// Muted text colour used for titles and hints.
pub const MUTED: Color = Color::Rgb(166, 149, 134);

pub fn palette_color(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

/// Printable label for a ledger key; a space would vanish in a chart.
pub fn key_label(key: &str) -> String {
    match key {
        " " => "SPACE".to_string(),
        k => k.to_string(),
    }
}

/// (label, failures) per mistyped letter, in first-seen order.
pub fn letter_bars(letters: &TypoLedger<LetterTypo>) -> Vec<(String, u64)> {
    letters
        .iter()
        .map(|r| (key_label(&r.key), r.failure_count as u64))
        .collect()
}

/// (finger, failures) for every finger that missed at least once.
pub fn finger_bars(letters: &TypoLedger<LetterTypo>) -> Vec<(String, u64)> {
    letters
        .failures_by_finger()
        .into_iter()
        .map(|(finger, count)| (finger.to_string(), count as u64))
        .collect()
}

/// The `n` most failed words, highest first.
pub fn top_words(words: &TypoLedger<WordTypo>, n: usize) -> Vec<(String, u32)> {
    words
        .sorted_by_failures()
        .into_iter()
        .take(n)
        .map(|r| (r.key.clone(), r.failure_count))
        .collect()
}

/// Width of each bar so that `bars` fit into `width` columns with one column gaps.
pub fn bar_width(bars: usize, width: u16) -> u16 {
    if bars == 0 {
        return 1;
    }
    let bars = bars as u16;
    (width.saturating_sub(bars.saturating_sub(1)) / bars).clamp(1, 9)
}

/// Format a speed value without a trailing `.0`
pub fn format_speed(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
