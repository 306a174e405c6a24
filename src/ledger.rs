use crate::finger::Finger;
use itertools::Itertools;
use std::fmt;

/// Kind-specific behaviour of a typo record.
///
/// The ledger is generic over this trait so that letter and word typos share
/// one lookup/insert path while the call site picks the kind statically.
pub trait TypoKind: Clone + fmt::Debug {
    /// Leading tag of the record's line in the statistics file.
    const TAG: &'static str;

    /// Derive the per-record data for a freshly inserted key.
    fn for_key(key: &str) -> Self;

    /// Trailing fields appended after `<TAG>;<key>;Count;<n>`.
    fn write_extra(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

/// A mistyped character. The finger is resolved once, at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterTypo {
    pub finger: Option<Finger>,
}

impl TypoKind for LetterTypo {
    const TAG: &'static str = "Letter";

    fn for_key(key: &str) -> Self {
        Self {
            finger: Finger::for_key(key),
        }
    }

    fn write_extra(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.finger {
            Some(finger) => write!(f, ";Finger;{finger}"),
            None => write!(f, ";Finger;"),
        }
    }
}

/// A word that was being typed when a mistake happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordTypo;

impl TypoKind for WordTypo {
    const TAG: &'static str = "Word";

    fn for_key(_key: &str) -> Self {
        WordTypo
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypoRecord<K> {
    pub key: String,
    pub failure_count: u32,
    pub kind: K,
}

impl<K: TypoKind> fmt::Display for TypoRecord<K> {
    /// Statistics file line, e.g. `Letter;x;Count;2;Finger;left RingFinger`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};Count;{}", K::TAG, self.key, self.failure_count)?;
        self.kind.write_extra(f)
    }
}

/// Deduplicating failure counters, kept in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypoLedger<K> {
    records: Vec<TypoRecord<K>>,
}

impl<K> Default for TypoLedger<K> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<K: TypoKind> TypoLedger<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` failures for `key`, inserting a new record if needed.
    /// Counts saturate at `u32::MAX`.
    pub fn record(&mut self, key: &str, count: u32) {
        match self.records.iter_mut().find(|r| r.key == key) {
            Some(existing) => existing.failure_count = existing.failure_count.saturating_add(count),
            None => self.records.push(TypoRecord {
                key: key.to_string(),
                failure_count: count,
                kind: K::for_key(key),
            }),
        }
    }

    /// Fold every record of `other` into this ledger.
    pub fn merge(&mut self, other: &TypoLedger<K>) {
        for record in other.iter() {
            self.record(&record.key, record.failure_count);
        }
    }

    pub fn get(&self, key: &str) -> Option<&TypoRecord<K>> {
        self.records.iter().find(|r| r.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypoRecord<K>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_failures(&self) -> u32 {
        self.records
            .iter()
            .fold(0, |acc: u32, r| acc.saturating_add(r.failure_count))
    }

    /// Records ordered by failure count, highest first. Ties keep first-seen order.
    pub fn sorted_by_failures(&self) -> Vec<&TypoRecord<K>> {
        self.records
            .iter()
            .sorted_by(|a, b| b.failure_count.cmp(&a.failure_count))
            .collect()
    }
}

impl TypoLedger<LetterTypo> {
    /// Failures summed per finger, in keyboard order. Unmapped keys are skipped.
    pub fn failures_by_finger(&self) -> Vec<(Finger, u32)> {
        Finger::ALL
            .into_iter()
            .filter_map(|finger| {
                let total = self
                    .records
                    .iter()
                    .filter(|r| r.kind.finger == Some(finger))
                    .fold(0, |acc: u32, r| acc.saturating_add(r.failure_count));
                (total > 0).then_some((finger, total))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_same_letter_twice_deduplicates() {
        let mut ledger = TypoLedger::<LetterTypo>::new();
        ledger.record("x", 1);
        ledger.record("x", 1);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("x").unwrap().failure_count, 2);
    }

    #[test]
    fn test_record_adds_count() {
        let mut ledger = TypoLedger::<WordTypo>::new();
        ledger.record("house", 3);
        ledger.record("house", 4);

        assert_eq!(ledger.get("house").unwrap().failure_count, 7);
    }

    #[test]
    fn test_record_saturates() {
        let mut ledger = TypoLedger::<WordTypo>::new();
        ledger.record("house", u32::MAX - 1);
        ledger.record("house", 5);
        ledger.record("mouse", 3);

        assert_eq!(ledger.get("house").unwrap().failure_count, u32::MAX);
        assert_eq!(ledger.total_failures(), u32::MAX);
    }

    #[test]
    fn test_letter_finger_assigned_on_insert() {
        let mut ledger = TypoLedger::<LetterTypo>::new();
        ledger.record("x", 1);
        ledger.record("7", 1);

        assert_eq!(ledger.get("x").unwrap().kind.finger, Some(Finger::LeftRing));
        assert_eq!(ledger.get("7").unwrap().kind.finger, None);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut ledger = TypoLedger::<LetterTypo>::new();
        ledger.record("a", 1);
        ledger.record("A", 1);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_failures(), 2);
    }

    #[test]
    fn test_merge_sums_by_key() {
        let mut history = TypoLedger::<WordTypo>::new();
        history.record("cat", 2);

        let mut session = TypoLedger::<WordTypo>::new();
        session.record("cat", 1);
        session.record("dog", 5);

        history.merge(&session);

        assert_eq!(history.get("cat").unwrap().failure_count, 3);
        assert_eq!(history.get("dog").unwrap().failure_count, 5);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_sorted_by_failures() {
        let mut ledger = TypoLedger::<WordTypo>::new();
        ledger.record("a", 1);
        ledger.record("b", 3);
        ledger.record("c", 1);

        let keys: Vec<&str> = ledger
            .sorted_by_failures()
            .iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_failures_by_finger() {
        let mut ledger = TypoLedger::<LetterTypo>::new();
        ledger.record("q", 2);
        ledger.record("A", 1);
        ledger.record("k", 4);
        ledger.record("9", 10);

        assert_eq!(
            ledger.failures_by_finger(),
            vec![(Finger::LeftPinky, 3), (Finger::RightRing, 4)]
        );
    }

    #[test]
    fn test_display_lines() {
        let mut letters = TypoLedger::<LetterTypo>::new();
        letters.record("x", 2);
        letters.record("1", 1);
        let mut words = TypoLedger::<WordTypo>::new();
        words.record("fox", 1);

        let lines: Vec<String> = letters.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            lines,
            vec!["Letter;x;Count;2;Finger;left RingFinger", "Letter;1;Count;1;Finger;"]
        );
        assert_eq!(words.get("fox").unwrap().to_string(), "Word;fox;Count;1");
    }
}
