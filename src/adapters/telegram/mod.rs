//! Telegram transport adapter. grammers client, session, update mapping.

pub mod gateway;
pub mod session;

pub use gateway::GrammersChatGateway;
