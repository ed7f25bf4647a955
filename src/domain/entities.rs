//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/IO types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};

/// One vocabulary pair: the word shown to the group and its expected translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub source: String,
    pub target: String,
}

/// Target word split into its leading article (if any) and the remaining root.
///
/// `article` keeps the original casing from the word list; comparisons
/// normalize both sides anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    pub article: Option<String>,
    pub root: String,
}

impl ParsedTarget {
    pub fn has_article(&self) -> bool {
        self.article.is_some()
    }
}

/// A chat participant as seen by the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub display_name: String,
}

/// One row of the score ledger. `display_name` is refreshed to the latest
/// seen value on every award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub user_id: i64,
    pub display_name: String,
    pub points: u64,
}

/// How the next round's word is picked from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Walk the list in order, wrapping to the start when exhausted.
    Sequential,
    /// Uniform random pick; the sequential cursor is left untouched.
    Random,
}

/// Whether scores accumulate per group or in one shared pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerScope {
    PerGroup,
    Global,
}

/// Inbound chat event, mapped by the transport adapter. Commands are parsed
/// at the adapter boundary; the core only sees the closed set below.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Command {
        group_id: i64,
        user: UserRef,
        command: Command,
    },
    Text {
        group_id: i64,
        user: UserRef,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartGame,
    EndGame,
    RestartGame,
    Score,
    ScoreAll,
    Leaderboard,
    Rules,
    ResetScores,
    AutoOn,
    AutoOff,
}
