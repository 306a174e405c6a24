//! Property-based tests for the keystroke state machine.

use proptest::prelude::*;

use super::{Keystroke, Outcome, Thok};

/// Never part of a generated prompt, so typing it is always a mistake.
const WRONG: char = '#';

fn words_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..8)
}

fn keystroke_strategy() -> impl Strategy<Value = Keystroke> {
    prop_oneof![
        4 => prop::sample::select(vec!['a', 'b', 'c', ' ']).prop_map(Keystroke::Char),
        1 => Just(Keystroke::Backspace),
    ]
}

proptest! {
    /// Property: typing the prompt exactly scores every character and leaves no error.
    #[test]
    fn prop_exact_typing_is_all_correct(words in words_strategy()) {
        let mut thok = Thok::new(&words);
        let prompt: Vec<char> = thok.prompt().chars().collect();

        for c in prompt {
            prop_assert_eq!(thok.write(c), Outcome::Correct);
        }

        prop_assert_eq!(thok.correct_count() as usize, thok.len());
        prop_assert_eq!(thok.wrong_count(), 0);
        prop_assert!(thok.pending_errors().is_empty());
        prop_assert!(!thok.cursor().has_active_error);
        prop_assert!(thok.is_exhausted());
        prop_assert!(thok.letter_typos().is_empty());
    }

    /// Property: one mistake erased by backspace leaves no pending error but
    /// stays in the ledgers.
    #[test]
    fn prop_corrected_mistake_is_remembered(
        words in words_strategy(),
        at in any::<prop::sample::Index>(),
    ) {
        let mut thok = Thok::new(&words);
        let prompt: Vec<char> = thok.prompt().chars().collect();
        let at = at.index(prompt.len());

        for (idx, &c) in prompt.iter().enumerate() {
            if idx == at {
                prop_assert_eq!(thok.write(WRONG), Outcome::Incorrect);
                prop_assert_eq!(thok.pending_errors().len(), 1);
                prop_assert_eq!(thok.backspace(), Outcome::Backspace);
            }
            prop_assert_eq!(thok.write(c), Outcome::Correct);
        }

        prop_assert!(thok.pending_errors().is_empty());
        prop_assert!(!thok.cursor().has_active_error);
        prop_assert_eq!(thok.correct_count() as usize, thok.len());
        prop_assert_eq!(thok.wrong_count(), 1);
        prop_assert_eq!(
            thok.letter_typos().get("#").map(|r| r.failure_count),
            Some(1)
        );

        // separators are not words
        let expected_word_typos = if prompt[at] == ' ' { 0 } else { 1 };
        prop_assert_eq!(thok.word_typos().total_failures(), expected_word_typos);
    }

    /// Property: for any interleaving of keys and backspaces the cursor stays
    /// in range, pending errors stay ordered below it, and the counters agree
    /// with the outcomes.
    #[test]
    fn prop_any_interleaving_keeps_invariants(
        words in prop::collection::vec("[abc]{1,4}", 1..5),
        keys in prop::collection::vec(keystroke_strategy(), 0..60),
    ) {
        let mut thok = Thok::new(&words);
        let (mut correct, mut wrong) = (0u32, 0u32);

        for key in keys {
            match thok.apply(key) {
                Outcome::Correct => correct += 1,
                Outcome::Incorrect => wrong += 1,
                Outcome::Backspace | Outcome::Ignored => {}
            }

            let cursor = thok.cursor();
            let pending = thok.pending_errors();
            prop_assert!(cursor.position <= thok.len());
            prop_assert!(pending.windows(2).all(|w| w[0].position < w[1].position));
            prop_assert!(pending.iter().all(|p| p.position < cursor.position));
            prop_assert_eq!(cursor.has_active_error, !pending.is_empty());
        }

        prop_assert_eq!(thok.correct_count(), correct);
        prop_assert_eq!(thok.wrong_count(), wrong);
        prop_assert_eq!(thok.letter_typos().total_failures(), wrong);
    }
}
