//! LifeOS Finance
//!
//! Turns free-form pt-BR money messages ("gastei 35,90 no Uber") into
//! structured, categorized transactions:
//! - Parses Brazilian Real amounts with locale-aware separators
//! - Cleans the description and classifies it into a closed category set
//! - Gates on completeness and classifier confidence
//! - Resolves ambiguous payloads through a follow-up confirmation turn
//! - Keeps at most one pending transaction per conversation
//!
//! TURN:
//! TEXT → EXTRACT → CLASSIFY → GATE → (OK | PENDING → CONFIRM) → RECORD

pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod state;
pub mod time;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{CategoryClassifier, KeywordClassifier, Prediction};
pub use pipeline::{apply_confirmation, ConfirmationResolver, TransactionBuilder};
