//! Per-group round state: the Idle ⇄ Active machine.
//!
//! One instance per group, created lazily by the group registry and reset
//! (never destroyed) on end/restart and on each rotation.

use crate::domain::catalog::WordCatalog;
use crate::domain::{ParsedTarget, UserRef, WordEntry};
use std::collections::HashSet;

/// State of the round currently in play. `first_guesser` is set at most once
/// and never cleared until the round ends; each set admits a user at most
/// once per round.
#[derive(Debug)]
pub struct ActiveRound {
    pub word: WordEntry,
    pub parsed: ParsedTarget,
    pub first_guesser: Option<UserRef>,
    pub sentence_submitters: HashSet<i64>,
    pub bonus_claimants: HashSet<i64>,
}

/// Round state for one group. Idle when `current` is `None`; the sequential
/// cursor survives individual rounds and is reset only by `restart`.
#[derive(Debug, Default)]
pub struct RoundState {
    current: Option<ActiveRound>,
    cursor: usize,
}

impl RoundState {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ActiveRound> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ActiveRound> {
        self.current.as_mut()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Install a new word. Starting over an active round silently overwrites
    /// it ("force new round"); the guesser and both per-round sets start
    /// empty either way.
    pub fn begin(&mut self, entry: WordEntry) {
        let parsed = WordCatalog::parse_article(&entry.target);
        self.current = Some(ActiveRound {
            word: entry,
            parsed,
            first_guesser: None,
            sentence_submitters: HashSet::new(),
            bonus_claimants: HashSet::new(),
        });
    }

    /// End the round, returning the word that was in play. `None` when
    /// already idle, so callers can report "not running" without mutating.
    pub fn finish(&mut self) -> Option<WordEntry> {
        self.current.take().map(|round| round.word)
    }

    /// End the round and rewind the sequential cursor. Scores are untouched.
    pub fn restart(&mut self) {
        self.current = None;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, target: &str) -> WordEntry {
        WordEntry {
            source: source.into(),
            target: target.into(),
        }
    }

    #[test]
    fn test_begin_parses_target_and_clears_round_state() {
        let mut state = RoundState::default();
        state.begin(entry("Katze", "die Katze"));

        let round = state.current().unwrap();
        assert_eq!(round.parsed.article.as_deref(), Some("die"));
        assert_eq!(round.parsed.root, "Katze");
        assert!(round.first_guesser.is_none());
        assert!(round.sentence_submitters.is_empty());
        assert!(round.bonus_claimants.is_empty());
    }

    #[test]
    fn test_begin_over_active_round_overwrites() {
        let mut state = RoundState::default();
        state.begin(entry("Katze", "die Katze"));
        state.current_mut().unwrap().sentence_submitters.insert(1);

        state.begin(entry("Buch", "Buch"));
        let round = state.current().unwrap();
        assert_eq!(round.word.source, "Buch");
        assert!(round.sentence_submitters.is_empty());
    }

    #[test]
    fn test_finish_returns_word_once() {
        let mut state = RoundState::default();
        state.begin(entry("Katze", "die Katze"));

        let word = state.finish().unwrap();
        assert_eq!(word.source, "Katze");
        assert!(!state.is_active());
        assert!(state.finish().is_none());
    }

    #[test]
    fn test_finish_keeps_cursor_restart_resets_it() {
        let mut state = RoundState::default();
        state.set_cursor(5);
        state.begin(entry("Katze", "die Katze"));

        state.finish();
        assert_eq!(state.cursor(), 5);

        state.begin(entry("Buch", "Buch"));
        state.restart();
        assert!(!state.is_active());
        assert_eq!(state.cursor(), 0);
    }
}
