//! Error types for the finance intake pipeline

use thiserror::Error;

/// Result type alias for finance operations
pub type Result<T> = std::result::Result<T, FinanceError>;

#[derive(Error, Debug)]
pub enum FinanceError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Empty text: nothing to extract a transaction from")]
    EmptyText,

    #[error("No pending transaction to confirm")]
    NoPending,

    // =============================
    // Surrounding Layers
    // =============================

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Pending state error: {0}")]
    State(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FinanceError {
    /// Stable machine code surfaced in the `error` field of pipeline results.
    pub fn code(&self) -> &'static str {
        match self {
            FinanceError::EmptyText => "empty_text",
            FinanceError::NoPending => "no_pending",
            FinanceError::InvalidConfig(_) => "invalid_config",
            FinanceError::InvalidTimezone(_) => "invalid_timezone",
            FinanceError::State(_) => "state_error",
            FinanceError::Ledger(_) => "ledger_error",
            FinanceError::SerializationError(_) => "serialization_error",
            FinanceError::IoError(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_codes() {
        assert_eq!(FinanceError::EmptyText.code(), "empty_text");
        assert_eq!(FinanceError::NoPending.code(), "no_pending");
    }
}
