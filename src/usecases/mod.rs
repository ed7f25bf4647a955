//! Application use cases. Orchestrate domain logic via ports.

pub mod game_service;
pub mod ledger;
pub mod scheduler;

pub use game_service::{GameService, GameSettings};
pub use ledger::ScoreLedger;
pub use scheduler::RoundScheduler;
