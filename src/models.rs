//! Core data models for the finance intake pipeline

use crate::error::FinanceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    #[default]
    Expense,
}

/// Closed set of category labels. `Outros` is the catch-all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Renda,
    Mercado,
    Moradia,
    Transporte,
    Lazer,
    #[serde(rename = "Saúde")]
    Saude,
    Assinaturas,
    #[serde(rename = "Educação")]
    Educacao,
    Viagem,
    #[default]
    Outros,
}

impl Category {
    /// Declaration order; correction matching walks it front to back.
    pub const ALL: [Category; 10] = [
        Category::Renda,
        Category::Mercado,
        Category::Moradia,
        Category::Transporte,
        Category::Lazer,
        Category::Saude,
        Category::Assinaturas,
        Category::Educacao,
        Category::Viagem,
        Category::Outros,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Renda => "Renda",
            Category::Mercado => "Mercado",
            Category::Moradia => "Moradia",
            Category::Transporte => "Transporte",
            Category::Lazer => "Lazer",
            Category::Saude => "Saúde",
            Category::Assinaturas => "Assinaturas",
            Category::Educacao => "Educação",
            Category::Viagem => "Viagem",
            Category::Outros => "Outros",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = label.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == wanted)
    }
}

/// Where a payload's confidence value came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    #[default]
    Classifier,
    HumanOverride,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    NeedConfirmation,
    Cancelled,
    Error,
}

//
// ================= Transaction Payload =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionPayload {
    #[serde(serialize_with = "serialize_amount", default)]
    pub amount: Option<Decimal>,
    pub currency: String,
    pub direction: Direction,
    pub category: Category,
    pub confidence: f64,
    #[serde(default)]
    pub confidence_source: ConfidenceSource,
    pub description: String,
    pub raw_text: String,
    pub ts_iso: String,
}

impl TransactionPayload {
    /// Marks category and amount as confirmed by a human.
    pub fn confirm_by_human(&mut self) {
        self.confidence = 1.0;
        self.confidence_source = ConfidenceSource::HumanOverride;
    }

    pub fn is_human_confirmed(&self) -> bool {
        self.confidence_source == ConfidenceSource::HumanOverride
    }
}

/// Amounts go out as JSON numbers, not decimal strings.
fn serialize_amount<S: Serializer>(amount: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
    match amount.and_then(|a| a.to_f64()) {
        Some(value) => s.serialize_f64(value),
        None => s.serialize_none(),
    }
}

/// Renders an amount with exactly two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

//
// ================= Pipeline Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transaction_payload: Option<TransactionPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message_draft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl PipelineResult {
    pub fn ok(payload: TransactionPayload, message: impl Into<String>) -> Self {
        Self::with_payload(Status::Ok, payload, message)
    }

    pub fn need_confirmation(payload: TransactionPayload, message: impl Into<String>) -> Self {
        Self::with_payload(Status::NeedConfirmation, payload, message)
    }

    pub fn cancelled(payload: TransactionPayload, message: impl Into<String>) -> Self {
        Self::with_payload(Status::Cancelled, payload, message)
    }

    pub fn failed(error: FinanceError) -> Self {
        Self {
            status: Status::Error,
            transaction_payload: None,
            message_draft: None,
            error: Some(error.code().to_string()),
        }
    }

    fn with_payload(status: Status, payload: TransactionPayload, message: impl Into<String>) -> Self {
        Self {
            status,
            transaction_payload: Some(payload),
            message_draft: Some(message.into()),
            error: None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Income => "income",
            Direction::Expense => "expense",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
