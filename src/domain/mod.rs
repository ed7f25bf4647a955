//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod guess;
pub mod round;

pub use catalog::WordCatalog;
pub use entities::{
    ChatEvent, Command, LedgerScope, ParsedTarget, ScoreEntry, SelectionMode, UserRef, WordEntry,
};
pub use errors::DomainError;
pub use guess::{Evaluation, PointValues};
pub use round::RoundState;
