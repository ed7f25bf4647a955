//! Implements NotifierPort and UpdateSource using the grammers Client.
//!
//! Maps raw Telegram updates into domain ChatEvents (command parsing happens
//! here, not in the core) and delivers replies. Peers are cached from inbound
//! updates so replies don't need dialog lookups.

use crate::domain::{ChatEvent, Command, DomainError, UserRef};
use crate::ports::{NotifierPort, UpdateSource};
use async_trait::async_trait;
use grammers_client::peer::{Peer, PeerRef};
use grammers_client::{Client, InputMessage, Update};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Display name used when Telegram gives us no sender name.
const UNKNOWN_NAME: &str = "Unbekannt";

/// Telegram gateway adapter. Wraps the grammers Client shared with the
/// bootstrap code in main.
pub struct GrammersChatGateway {
    client: Client,
    /// Cache PeerRef by group id so replies and scheduled announcements can
    /// address chats without resolving dialogs (bots cannot enumerate them).
    peer_cache: Mutex<HashMap<i64, PeerRef>>,
}

impl GrammersChatGateway {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Sign in with the bot token unless the persisted session is already
    /// authorized.
    pub async fn ensure_bot_authorized(
        &self,
        token: &str,
        api_hash: &str,
    ) -> Result<(), DomainError> {
        let authorized = self
            .client
            .is_authorized()
            .await
            .map_err(|e| DomainError::Auth(e.to_string()))?;
        if authorized {
            debug!("session already authorized");
            return Ok(());
        }
        self.client
            .bot_sign_in(token, api_hash)
            .await
            .map_err(|e| DomainError::Auth(format!("bot sign in: {}", e)))?;
        info!("bot signed in");
        Ok(())
    }

    /// Map one raw update to a domain event. `None` for anything the game
    /// does not care about: outgoing messages, private chats, non-text
    /// updates, unknown commands.
    async fn map_update(&self, update: Update) -> Option<ChatEvent> {
        let Update::NewMessage(message) = update else {
            return None;
        };
        if message.outgoing() {
            return None;
        }
        let peer = message.chat();
        // The quiz only runs in group chats.
        if matches!(peer, Peer::User(_)) {
            return None;
        }
        let group_id = peer.id().bot_api_dialog_id();
        self.remember_peer(group_id, &peer).await;

        let sender = message.sender()?;
        let user = UserRef {
            id: sender.id().bot_api_dialog_id(),
            display_name: sender
                .name()
                .map(String::from)
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        };

        let text = message.text().trim();
        if text.is_empty() {
            return None;
        }
        if text.starts_with('/') {
            let command = parse_command(text)?;
            Some(ChatEvent::Command {
                group_id,
                user,
                command,
            })
        } else {
            Some(ChatEvent::Text {
                group_id,
                user,
                text: text.to_string(),
            })
        }
    }

    async fn remember_peer(&self, group_id: i64, peer: &Peer) {
        {
            let cache = self.peer_cache.lock().await;
            if cache.contains_key(&group_id) {
                return;
            }
        }
        if let Some(peer_ref) = peer.to_ref().await {
            self.peer_cache.lock().await.insert(group_id, peer_ref);
        }
    }
}

#[async_trait]
impl NotifierPort for GrammersChatGateway {
    async fn send(&self, group_id: i64, text: &str, markdown: bool) -> Result<(), DomainError> {
        let peer_ref = self
            .peer_cache
            .lock()
            .await
            .get(&group_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::Transport(format!("no cached peer for group {}", group_id))
            })?;
        let message = if markdown {
            InputMessage::markdown(text)
        } else {
            InputMessage::text(text)
        };
        self.client
            .send_message(peer_ref, message)
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for GrammersChatGateway {
    async fn next_event(&self) -> Result<Option<ChatEvent>, DomainError> {
        loop {
            let update = self
                .client
                .next_update()
                .await
                .map_err(|e| DomainError::Transport(e.to_string()))?;
            if let Some(event) = self.map_update(update).await {
                return Ok(Some(event));
            }
        }
    }
}

/// Parse a leading bot command, tolerating the `@botname` suffix Telegram
/// appends in groups. Unknown commands map to `None` and are ignored.
fn parse_command(text: &str) -> Option<Command> {
    let stripped = text.strip_prefix('/')?;
    let name = stripped.split_whitespace().next()?;
    let name = name.split('@').next()?;
    match name.to_ascii_lowercase().as_str() {
        "startgame" => Some(Command::StartGame),
        "endgame" => Some(Command::EndGame),
        "restartgame" => Some(Command::RestartGame),
        "score" => Some(Command::Score),
        "scoreall" => Some(Command::ScoreAll),
        "leaderboard" => Some(Command::Leaderboard),
        "rules" => Some(Command::Rules),
        "resetscores" => Some(Command::ResetScores),
        "auto_on" => Some(Command::AutoOn),
        "auto_off" => Some(Command::AutoOff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(parse_command("/startgame"), Some(Command::StartGame));
        assert_eq!(parse_command("/endgame"), Some(Command::EndGame));
        assert_eq!(parse_command("/auto_on"), Some(Command::AutoOn));
        assert_eq!(parse_command("/leaderboard"), Some(Command::Leaderboard));
    }

    #[test]
    fn test_parse_command_with_bot_suffix() {
        assert_eq!(
            parse_command("/startgame@wortrunde_bot"),
            Some(Command::StartGame)
        );
    }

    #[test]
    fn test_parse_command_ignores_trailing_arguments() {
        assert_eq!(parse_command("/score bitte"), Some(Command::Score));
    }

    #[test]
    fn test_parse_unknown_or_plain_text_is_none() {
        assert_eq!(parse_command("/frobnicate"), None);
        assert_eq!(parse_command("die katze"), None);
        assert_eq!(parse_command("/"), None);
    }
}
