//! Persistence adapters. JSON file storage for the score ledger.

pub mod score_json;

pub use score_json::JsonScoreStore;
