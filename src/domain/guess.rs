//! Guess evaluation: classifies an incoming group message against the active
//! round and applies the per-round idempotence rules.
//!
//! Dispatch priority is fixed: bonus keyword, then the translation gate, then
//! sentence evaluation. One message triggers at most one outcome; with no
//! active round the message is ignored entirely.

use crate::domain::round::RoundState;
use crate::domain::{ParsedTarget, UserRef};

/// Literal trigger for the recurring bonus task. Matched after trimming
/// only — the keyword is case-sensitive.
pub const BONUS_KEYWORD: &str = "Aufgabe+";

/// Minimum whitespace-separated tokens for a qualifying sentence.
pub const MIN_SENTENCE_TOKENS: usize = 5;

/// Point rewards. Named configuration, not hidden literals: observed
/// deployments disagree on the first-guess value (1 vs 3), so the canonical
/// amount is a deployment decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointValues {
    pub first_guess: u64,
    pub sentence: u64,
    pub bonus: u64,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            first_guess: 1,
            sentence: 2,
            bonus: 3,
        }
    }
}

/// Outcome of evaluating one message. Award-carrying variants have already
/// recorded the user in the round state; the caller only applies the points
/// and the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    BonusAwarded { points: u64 },
    BonusAlreadyClaimed,
    FirstGuessCorrect { points: u64 },
    GuessIncorrect { article_hint: bool },
    TooLate { first: UserRef },
    SentenceAccepted { points: u64 },
    SentenceTooShort,
    SentenceMissingWord,
    SentenceIgnored,
}

/// Trim, collapse internal whitespace runs to one space, lowercase.
/// Applied identically to guesses and expected answers; idempotent.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn is_bonus_keyword(text: &str) -> bool {
    text.trim() == BONUS_KEYWORD
}

/// The normalized answer the round expects: `article root` when the target
/// carries one, the bare root otherwise.
pub fn expected_answer(parsed: &ParsedTarget) -> String {
    match &parsed.article {
        Some(article) => normalize(&format!("{} {}", article, parsed.root)),
        None => normalize(&parsed.root),
    }
}

/// Evaluate one message against the group's round. Returns `None` when the
/// round is idle. Mutates the round state for award-carrying outcomes.
pub fn evaluate(
    state: &mut RoundState,
    user: &UserRef,
    text: &str,
    points: PointValues,
) -> Option<Evaluation> {
    let round = state.current_mut()?;

    // 1) Bonus claim, once per user per round.
    if is_bonus_keyword(text) {
        if round.bonus_claimants.contains(&user.id) {
            return Some(Evaluation::BonusAlreadyClaimed);
        }
        round.bonus_claimants.insert(user.id);
        return Some(Evaluation::BonusAwarded {
            points: points.bonus,
        });
    }

    let guess = normalize(text);
    let expected = expected_answer(&round.parsed);

    // 2) Translation gate. While nobody has guessed, every message is a
    // guess attempt. Once somebody was first, only an exact re-match of the
    // answer is blocked; everything else falls through to sentence checking.
    match &round.first_guesser {
        None => {
            if guess == expected {
                round.first_guesser = Some(user.clone());
                return Some(Evaluation::FirstGuessCorrect {
                    points: points.first_guess,
                });
            }
            return Some(Evaluation::GuessIncorrect {
                article_hint: round.parsed.has_article(),
            });
        }
        Some(first) => {
            if guess == expected {
                return Some(Evaluation::TooLate {
                    first: first.clone(),
                });
            }
        }
    }

    // 3) Sentence submission, once per user per round.
    if round.sentence_submitters.contains(&user.id) {
        return Some(Evaluation::SentenceIgnored);
    }
    if text.split_whitespace().count() < MIN_SENTENCE_TOKENS {
        return Some(Evaluation::SentenceTooShort);
    }
    if !guess.contains(&normalize(&round.parsed.root)) {
        return Some(Evaluation::SentenceMissingWord);
    }
    round.sentence_submitters.insert(user.id);
    Some(Evaluation::SentenceAccepted {
        points: points.sentence,
    })
}
