//! Score ledger: per-scope cumulative points with a write-through durable
//! mirror.
//!
//! The in-memory snapshot is the single source of truth while the process
//! runs; disk is never re-read after `restore`. Saves happen under the same
//! write lock that guards the mutation, so the whole blob has exactly one
//! writer at a time regardless of how many groups award concurrently.

use crate::domain::{LedgerScope, ScoreEntry, UserRef};
use crate::ports::{LedgerSnapshot, ScoreStorePort};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Scope key used when all groups share one pool.
const GLOBAL_SCOPE_KEY: &str = "global";

pub struct ScoreLedger {
    store: Arc<dyn ScoreStorePort>,
    scope: LedgerScope,
    entries: RwLock<LedgerSnapshot>,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn ScoreStorePort>, scope: LedgerScope) -> Self {
        Self {
            store,
            scope,
            entries: RwLock::new(LedgerSnapshot::default()),
        }
    }

    /// Load the persisted snapshot once at startup. A corrupt or unreadable
    /// store is logged and replaced by an empty ledger — losing history is
    /// acceptable, refusing to serve is not.
    pub async fn restore(&self) {
        match self.store.load().await {
            Ok(snapshot) => {
                let scopes = snapshot.len();
                *self.entries.write().await = snapshot;
                info!(scopes, "score ledger restored");
            }
            Err(e) => {
                warn!(error = %e, "score store unreadable, starting with an empty ledger");
            }
        }
    }

    /// Render the scope key for a group under the configured scoring mode.
    pub fn scope_key(&self, group_id: i64) -> String {
        match self.scope {
            LedgerScope::Global => GLOBAL_SCOPE_KEY.to_string(),
            LedgerScope::PerGroup => group_id.to_string(),
        }
    }

    /// Add points for a user, creating the entry at 0 on first award and
    /// refreshing the display name to the latest seen value. Returns the new
    /// total. The durable mirror is updated before returning; a save failure
    /// is logged, never surfaced to the scoring path.
    pub async fn award(&self, scope_key: &str, user: &UserRef, delta: u64) -> u64 {
        let mut entries = self.entries.write().await;
        let scoped = entries.entry(scope_key.to_string()).or_default();
        let idx = match scoped.iter().position(|e| e.user_id == user.id) {
            Some(idx) => idx,
            None => {
                scoped.push(ScoreEntry {
                    user_id: user.id,
                    display_name: user.display_name.clone(),
                    points: 0,
                });
                scoped.len() - 1
            }
        };
        scoped[idx].display_name = user.display_name.clone();
        scoped[idx].points += delta;
        let total = scoped[idx].points;
        self.persist(&entries).await;
        total
    }

    /// Current points for a user, 0 if absent.
    pub async fn get(&self, scope_key: &str, user_id: i64) -> u64 {
        self.entries
            .read()
            .await
            .get(scope_key)
            .and_then(|scoped| scoped.iter().find(|e| e.user_id == user_id))
            .map(|e| e.points)
            .unwrap_or(0)
    }

    /// Entries sorted by points descending. The sort is stable, so equal
    /// scores keep their insertion order — there is no secondary key.
    pub async fn leaderboard(&self, scope_key: &str) -> Vec<ScoreEntry> {
        let mut rows = self
            .entries
            .read()
            .await
            .get(scope_key)
            .cloned()
            .unwrap_or_default();
        rows.sort_by(|a, b| b.points.cmp(&a.points));
        rows
    }

    /// Drop every entry under the scope and persist.
    pub async fn reset_all(&self, scope_key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(scope_key);
        self.persist(&entries).await;
    }

    async fn persist(&self, snapshot: &LedgerSnapshot) {
        if let Err(e) = self.store.save(snapshot).await {
            warn!(error = %e, "score store save failed, keeping in-memory ledger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use tokio::sync::Mutex;

    /// In-memory store capturing the last saved snapshot.
    struct MemStore {
        saved: Mutex<Option<LedgerSnapshot>>,
        fail_load: bool,
    }

    impl MemStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                saved: Mutex::new(None),
                fail_load: false,
            })
        }

        fn corrupt() -> Arc<Self> {
            Arc::new(Self {
                saved: Mutex::new(None),
                fail_load: true,
            })
        }
    }

    #[async_trait::async_trait]
    impl ScoreStorePort for MemStore {
        async fn load(&self) -> Result<LedgerSnapshot, DomainError> {
            if self.fail_load {
                return Err(DomainError::Store("corrupt blob".into()));
            }
            Ok(self.saved.lock().await.clone().unwrap_or_default())
        }

        async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), DomainError> {
            *self.saved.lock().await = Some(snapshot.clone());
            Ok(())
        }
    }

    fn user(id: i64, name: &str) -> UserRef {
        UserRef {
            id,
            display_name: name.into(),
        }
    }

    #[tokio::test]
    async fn test_award_accumulates_and_refreshes_name() {
        let ledger = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        assert_eq!(ledger.award("g", &user(1, "Anna"), 1).await, 1);
        assert_eq!(ledger.award("g", &user(1, "Anna B"), 2).await, 3);

        assert_eq!(ledger.get("g", 1).await, 3);
        let rows = ledger.leaderboard("g").await;
        assert_eq!(rows[0].display_name, "Anna B");
    }

    #[tokio::test]
    async fn test_get_absent_is_zero() {
        let ledger = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        assert_eq!(ledger.get("g", 99).await, 0);
    }

    #[tokio::test]
    async fn test_leaderboard_sorts_desc_with_insertion_tie_order() {
        let ledger = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        ledger.award("g", &user(1, "Anna"), 2).await;
        ledger.award("g", &user(2, "Boris"), 5).await;
        ledger.award("g", &user(3, "Clara"), 2).await;

        let rows = ledger.leaderboard("g").await;
        let ids: Vec<i64> = rows.iter().map(|e| e.user_id).collect();
        // Boris first; Anna before Clara because she was inserted earlier.
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let ledger = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        ledger.award("g1", &user(1, "Anna"), 2).await;
        ledger.award("g2", &user(1, "Anna"), 5).await;

        assert_eq!(ledger.get("g1", 1).await, 2);
        assert_eq!(ledger.get("g2", 1).await, 5);
    }

    #[tokio::test]
    async fn test_reset_all_empties_scope() {
        let ledger = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        ledger.award("g1", &user(1, "Anna"), 2).await;
        ledger.award("g2", &user(2, "Boris"), 1).await;

        ledger.reset_all("g1").await;
        assert!(ledger.leaderboard("g1").await.is_empty());
        // Other scopes are untouched.
        assert_eq!(ledger.get("g2", 2).await, 1);
    }

    #[tokio::test]
    async fn test_awards_write_through_to_store() {
        let store = MemStore::new();
        let ledger = ScoreLedger::new(Arc::clone(&store) as Arc<dyn ScoreStorePort>, LedgerScope::PerGroup);
        ledger.award("g", &user(1, "Anna"), 2).await;

        let saved = store.saved.lock().await.clone().unwrap();
        assert_eq!(saved["g"][0].points, 2);
    }

    #[tokio::test]
    async fn test_restore_tolerates_corrupt_store() {
        let ledger = ScoreLedger::new(MemStore::corrupt(), LedgerScope::PerGroup);
        ledger.restore().await;
        assert!(ledger.leaderboard("g").await.is_empty());
        // Ledger still accepts awards afterwards.
        assert_eq!(ledger.award("g", &user(1, "Anna"), 1).await, 1);
    }

    #[tokio::test]
    async fn test_restore_loads_persisted_entries() {
        let store = MemStore::new();
        let first = ScoreLedger::new(Arc::clone(&store) as Arc<dyn ScoreStorePort>, LedgerScope::Global);
        let key = first.scope_key(42);
        assert_eq!(key, "global");
        first.award(&key, &user(1, "Anna"), 4).await;

        let second = ScoreLedger::new(store, LedgerScope::Global);
        second.restore().await;
        assert_eq!(second.get("global", 1).await, 4);
    }

    #[tokio::test]
    async fn test_scope_key_modes() {
        let per_group = ScoreLedger::new(MemStore::new(), LedgerScope::PerGroup);
        assert_eq!(per_group.scope_key(-1001), "-1001");
        let global = ScoreLedger::new(MemStore::new(), LedgerScope::Global);
        assert_eq!(global.scope_key(-1001), "global");
    }
}
