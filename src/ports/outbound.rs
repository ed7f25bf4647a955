//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, ScoreEntry};
use std::collections::HashMap;

/// Full ledger snapshot as persisted: scope key -> entries in insertion
/// order. The per-scope `Vec` is what backs the leaderboard tie-order
/// guarantee, so adapters must not reorder it.
pub type LedgerSnapshot = HashMap<String, Vec<ScoreEntry>>;

/// Outbound message delivery into a group chat.
#[async_trait::async_trait]
pub trait NotifierPort: Send + Sync {
    /// Send `text` to the group. `markdown` is an opaque emphasis hint; the
    /// core does not interpret it further.
    async fn send(&self, group_id: i64, text: &str, markdown: bool) -> Result<(), DomainError>;
}

/// Durable persistence for the score ledger.
#[async_trait::async_trait]
pub trait ScoreStorePort: Send + Sync {
    /// Load the persisted snapshot. A missing store yields an empty
    /// snapshot (first run); a corrupt one is an error the caller may
    /// tolerate.
    async fn load(&self) -> Result<LedgerSnapshot, DomainError>;

    /// Persist the full snapshot (write-through, no batching).
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), DomainError>;
}
