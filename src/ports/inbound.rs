//! Inbound port. The transport adapter feeds chat events into the
//! application.

use crate::domain::{ChatEvent, DomainError};

/// Stream of inbound chat events. The adapter parses raw updates (including
/// command routing) before they reach the core.
#[async_trait::async_trait]
pub trait UpdateSource: Send + Sync {
    /// Next event, or `None` when the transport has shut down.
    async fn next_event(&self) -> Result<Option<ChatEvent>, DomainError>;
}
