//! Confirmation resolver
//!
//! Interprets one follow-up line against a pending payload. Rules are tried
//! in strict priority order and the first match wins:
//!
//! 1. no pending payload → `error` (`no_pending`)
//! 2. cancellation marker → `cancelled`, payload untouched
//! 3. category name → category overwritten, confidence 1.0
//! 4. parseable amount → amount overwritten
//! 5. affirmation marker → confidence 1.0
//! 6. otherwise → still `need_confirmation`
//!
//! Corrections (3, 4) outrank blanket affirmation (5), so "sim, 50" fixes
//! the amount.

use crate::error::FinanceError;
use crate::extract::extract_amount;
use crate::models::{format_amount, PipelineResult, TransactionPayload};
use crate::rules::MarkerSet;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ConfirmationResolver {
    markers: Arc<MarkerSet>,
}

impl ConfirmationResolver {
    pub fn new(markers: Arc<MarkerSet>) -> Self {
        Self { markers }
    }

    pub fn resolve(&self, user_text: &str, pending: Option<&TransactionPayload>) -> PipelineResult {
        let Some(pending) = pending else {
            warn!("Confirmation requested without a pending transaction");
            return PipelineResult::failed(FinanceError::NoPending);
        };

        let text = user_text.trim().to_lowercase();
        let mut payload = pending.clone();

        if self.markers.cancel.matches(&text) {
            info!(outcome = "cancel", "Confirmation resolved");
            return PipelineResult::cancelled(payload, "Ok, cancelei esse lançamento.");
        }

        if let Some(rule) = self.markers.categories.first_match(&text) {
            payload.category = rule.outcome;
            payload.confirm_by_human();
            info!(outcome = "category", category = %payload.category, "Confirmation resolved");
            let message = format!("Fechado: categoria ajustada para {}.", payload.category);
            return PipelineResult::ok(payload, message);
        }

        if let Some(amount) = extract_amount(&text) {
            payload.amount = Some(amount);
            info!(outcome = "amount", amount = %amount, "Confirmation resolved");
            let message = format!(
                "Fechado: valor ajustado para {} {}.",
                format_amount(amount),
                payload.currency
            );
            return PipelineResult::ok(payload, message);
        }

        if self.markers.affirm.matches(&text) {
            payload.confirm_by_human();
            info!(outcome = "affirm", "Confirmation resolved");
            return PipelineResult::ok(payload, "Perfeito, confirmado.");
        }

        info!(outcome = "unresolved", "Confirmation still pending");
        PipelineResult::need_confirmation(
            payload,
            "Não entendi. Confirma (sim) ou diga a categoria/valor correto.",
        )
    }
}

impl Default for ConfirmationResolver {
    fn default() -> Self {
        Self::new(Arc::new(MarkerSet::pt_br()))
    }
}

/// Resolve with the default pt-BR markers.
pub fn apply_confirmation(user_text: &str, pending: Option<&TransactionPayload>) -> PipelineResult {
    ConfirmationResolver::default().resolve(user_text, pending)
}
