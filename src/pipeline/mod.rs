//! Transaction pipeline
//!
//! Two entry points for the orchestrating caller:
//! - [`TransactionBuilder::build`]: free text → payload + gate decision
//! - [`ConfirmationResolver::resolve`]: follow-up text + pending payload → outcome
//!
//! Both are pure over their inputs (plus the clock for `ts_iso`) and never
//! touch pending state or storage.

pub mod builder;
pub mod confirmation;

pub use builder::{TransactionBuilder, DEFAULT_CONFIDENCE_THRESHOLD};
pub use confirmation::{apply_confirmation, ConfirmationResolver};
