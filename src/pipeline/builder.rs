//! Transaction payload builder
//!
//! Composes extraction and classification into a canonical payload, then
//! gates it: a missing amount always asks for the amount; a present amount
//! with low classifier confidence asks to confirm the category.

use crate::classifier::CategoryClassifier;
use crate::error::FinanceError;
use crate::extract::{clean_description, detect_direction, extract_amount};
use crate::models::{format_amount, ConfidenceSource, PipelineResult, TransactionPayload};
use crate::rules::MarkerSet;
use crate::time::{to_ts_iso, Clock, SystemClock};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.55;
pub const DEFAULT_CURRENCY: &str = "BRL";

pub struct TransactionBuilder {
    classifier: Arc<dyn CategoryClassifier>,
    clock: Arc<dyn Clock>,
    markers: Arc<MarkerSet>,
    currency: String,
}

impl TransactionBuilder {
    pub fn new(classifier: Arc<dyn CategoryClassifier>) -> Self {
        Self {
            classifier,
            clock: Arc::new(SystemClock::default()),
            markers: Arc::new(MarkerSet::pt_br()),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_markers(mut self, markers: Arc<MarkerSet>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn markers(&self) -> &Arc<MarkerSet> {
        &self.markers
    }

    /// Build a payload from a raw utterance and decide `ok` vs `need_confirmation`.
    ///
    /// Never fails: empty input comes back as an `error` result without a payload.
    pub fn build(&self, raw_text: &str, confidence_threshold: f64) -> PipelineResult {
        if raw_text.trim().is_empty() {
            debug!("Rejecting empty transaction text");
            return PipelineResult::failed(FinanceError::EmptyText);
        }

        let amount = extract_amount(raw_text);
        let description = clean_description(raw_text);
        let direction = detect_direction(raw_text, &self.markers.direction);
        let prediction = self.classifier.classify(&description).sanitized();

        let payload = TransactionPayload {
            amount,
            currency: self.currency.clone(),
            direction,
            category: prediction.category,
            confidence: prediction.confidence,
            confidence_source: ConfidenceSource::Classifier,
            description,
            raw_text: raw_text.to_string(),
            ts_iso: to_ts_iso(self.clock.now()),
        };

        let result = gate(payload, confidence_threshold);

        info!(
            status = ?result.status,
            category = %prediction.category,
            confidence = prediction.confidence,
            has_amount = amount.is_some(),
            "Transaction payload built"
        );

        result
    }
}

/// Completeness first, then confidence.
fn gate(payload: TransactionPayload, confidence_threshold: f64) -> PipelineResult {
    let Some(amount) = payload.amount else {
        return PipelineResult::need_confirmation(
            payload,
            "Não encontrei o valor. Qual foi o valor (em R$) desse gasto/receita?",
        );
    };

    if payload.confidence < confidence_threshold {
        let message = format!(
            "Confirma a categoria '{}' para o valor {} {}?",
            payload.category,
            format_amount(amount),
            payload.currency
        );
        return PipelineResult::need_confirmation(payload, message);
    }

    let message = format!(
        "Registrado: {} - {} {}.",
        payload.category,
        format_amount(amount),
        payload.currency
    );
    PipelineResult::ok(payload, message)
}
