//! Implements ScoreStorePort using a JSON file.
//!
//! Holds the full ledger snapshot: scope key -> score entries in insertion
//! order. The in-memory ledger is the source of truth; this file is its
//! write-through mirror.

use crate::domain::DomainError;
use crate::ports::{LedgerSnapshot, ScoreStorePort};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// JSON file-based score storage.
pub struct JsonScoreStore {
    path: std::path::PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl ScoreStorePort for JsonScoreStore {
    /// A missing file is a normal first run and loads empty. A file that
    /// exists but does not parse is an error; the ledger decides whether to
    /// tolerate it.
    async fn load(&self) -> Result<LedgerSnapshot, DomainError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(_) => return Ok(LedgerSnapshot::default()),
        };
        serde_json::from_str(&text)
            .map_err(|e| DomainError::Store(format!("parse {}: {}", self.path.display(), e)))
    }

    /// Atomic save using the write-replace pattern:
    /// 1. Write to temp file
    /// 2. sync_all() to ensure flush to disk
    /// 3. Atomic rename to target path
    /// This prevents data loss if the process crashes mid-write.
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Store(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Store(format!("sync temp file: {}", e)))?;
        drop(f); // Close file handle before rename

        // Atomic rename: replaces target file in one operation
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Store(format!("atomic rename failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoreEntry;

    fn snapshot_with_one_entry() -> LedgerSnapshot {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.insert(
            "-1001".to_string(),
            vec![ScoreEntry {
                user_id: 7,
                display_name: "Anna".into(),
                points: 4,
            }],
        );
        snapshot
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonScoreStore::new(dir.path().join("points.json"));

        store.save(&snapshot_with_one_entry()).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded["-1001"][0].display_name, "Anna");
        assert_eq!(loaded["-1001"][0].points, 4);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonScoreStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = JsonScoreStore::new(&path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_save_preserves_entry_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonScoreStore::new(dir.path().join("points.json"));

        let mut snapshot = LedgerSnapshot::default();
        snapshot.insert(
            "g".to_string(),
            vec![
                ScoreEntry {
                    user_id: 2,
                    display_name: "Boris".into(),
                    points: 1,
                },
                ScoreEntry {
                    user_id: 1,
                    display_name: "Anna".into(),
                    points: 1,
                },
            ],
        );
        store.save(&snapshot).await.unwrap();

        let loaded = store.load().await.unwrap();
        let ids: Vec<i64> = loaded["g"].iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
