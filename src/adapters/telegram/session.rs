//! Session management. Load/save grammers session.
//!
//! Uses grammers-session's SqliteSession so the bot's authorization is
//! preserved across restarts (no re-sign-in with the token on every boot).

use grammers_session::storages::SqliteSession;
use std::path::Path;

/// Opens persistent session storage at the given path, creating the file and
/// any parent directories as needed.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the SQLite
/// database cannot be opened (e.g. permissions, disk full).
pub async fn open_file_session(path: impl AsRef<Path>) -> anyhow::Result<SqliteSession> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("create session directory: {}", e))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("open session file: {}", e))
}
