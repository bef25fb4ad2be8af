//! Finance agent - one conversational turn at a time
//!
//! TEXT → (PENDING? RESOLVE : BUILD) → STORE / CLEAR / RECORD → OUTCOME

use crate::classifier::{CategoryClassifier, KeywordClassifier};
use crate::config::FinanceConfig;
use crate::ledger::{InMemoryLedger, TransactionLedger};
use crate::models::{PipelineResult, Status, TransactionPayload};
use crate::pipeline::{ConfirmationResolver, TransactionBuilder};
use crate::rules::MarkerSet;
use crate::state::{InMemoryPendingStore, PendingStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Shorter inputs are not worth a turn
const MIN_TEXT_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Ok,
    NeedConfirmation,
    Cancelled,
    Error,
    Ignored,
}

impl From<Status> for TurnStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => TurnStatus::Ok,
            Status::NeedConfirmation => TurnStatus::NeedConfirmation,
            Status::Cancelled => TurnStatus::Cancelled,
            Status::Error => TurnStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnAction {
    SaveTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinanceOutcome {
    pub status: TurnStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transaction_payload: Option<TransactionPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message_draft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action: Option<TurnAction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transaction_id: Option<Uuid>,
}

impl FinanceOutcome {
    fn ignored() -> Self {
        Self {
            status: TurnStatus::Ignored,
            transaction_payload: None,
            message_draft: None,
            error: None,
            action: None,
            transaction_id: None,
        }
    }
}

impl From<PipelineResult> for FinanceOutcome {
    fn from(result: PipelineResult) -> Self {
        Self {
            status: result.status.into(),
            transaction_payload: result.transaction_payload,
            message_draft: result.message_draft,
            error: result.error,
            action: None,
            transaction_id: None,
        }
    }
}

/// Coordinates the pipeline with pending state and the ledger
pub struct FinanceAgent {
    builder: TransactionBuilder,
    resolver: ConfirmationResolver,
    pending: Box<dyn PendingStore>,
    ledger: Box<dyn TransactionLedger>,
    confidence_threshold: f64,
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FinanceAgent {
    pub fn new(
        builder: TransactionBuilder,
        pending: Box<dyn PendingStore>,
        ledger: Box<dyn TransactionLedger>,
        confidence_threshold: f64,
    ) -> Self {
        let resolver = ConfirmationResolver::new(builder.markers().clone());
        Self {
            builder,
            resolver,
            pending,
            ledger,
            confidence_threshold,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// In-memory agent wired from configuration.
    pub fn from_config(config: &FinanceConfig, classifier: Arc<dyn CategoryClassifier>) -> Result<Self> {
        let builder = TransactionBuilder::new(classifier)
            .with_clock(Arc::new(config.clock()?))
            .with_markers(Arc::new(MarkerSet::pt_br()))
            .with_currency(config.currency.clone());

        Ok(Self::new(
            builder,
            Box::new(InMemoryPendingStore::new()),
            Box::new(InMemoryLedger::new()),
            config.confidence_threshold,
        ))
    }

    pub fn with_defaults() -> Result<Self> {
        Self::from_config(&FinanceConfig::default(), Arc::new(KeywordClassifier::new()))
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    pub fn resolver(&self) -> &ConfirmationResolver {
        &self.resolver
    }

    pub fn pending(&self) -> &dyn PendingStore {
        self.pending.as_ref()
    }

    pub fn ledger(&self) -> &dyn TransactionLedger {
        self.ledger.as_ref()
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    async fn turn_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the conversation's lock entry unless another turn is holding
    /// or waiting on it.
    async fn release_turn_lock(&self, conversation_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.turn_locks.lock().await;
        // one reference in the map, one in `lock`
        if Arc::strong_count(&lock) == 2 {
            locks.remove(conversation_id);
        }
    }

    /// Process one user message for a conversation.
    ///
    /// The conversation's turn lock is held for the whole turn, so the
    /// get → resolve → clear sequence cannot interleave with another turn
    /// of the same conversation.
    ///
    /// A committed payload may carry `amount: None`: a bare affirmation
    /// confirms whatever is pending, including a payload still missing its
    /// amount.
    pub async fn handle(&self, conversation_id: &str, text: &str) -> Result<FinanceOutcome> {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            debug!(conversation_id = %conversation_id, "Ignoring input that is too short");
            return Ok(FinanceOutcome::ignored());
        }

        let lock = self.turn_lock(conversation_id).await;
        let outcome = {
            let _turn = lock.lock().await;
            self.run_turn(conversation_id, text).await
        };
        self.release_turn_lock(conversation_id, lock).await;

        outcome
    }

    async fn run_turn(&self, conversation_id: &str, text: &str) -> Result<FinanceOutcome> {
        match self.pending.get(conversation_id).await? {
            Some(pending) => self.continue_pending(conversation_id, text, &pending).await,
            None => self.start_new(conversation_id, text).await,
        }
    }

    async fn continue_pending(
        &self,
        conversation_id: &str,
        text: &str,
        pending: &TransactionPayload,
    ) -> Result<FinanceOutcome> {
        let result = self.resolver.resolve(text, Some(pending));

        match result.status {
            Status::Ok => {
                // a failed commit leaves the payload pending for a retry
                let outcome = self.commit(conversation_id, result).await?;
                self.pending.clear(conversation_id).await?;
                Ok(outcome)
            }
            Status::Cancelled => {
                self.pending.clear(conversation_id).await?;
                info!(conversation_id = %conversation_id, "Pending transaction cancelled");
                Ok(result.into())
            }
            Status::NeedConfirmation | Status::Error => Ok(result.into()),
        }
    }

    async fn start_new(&self, conversation_id: &str, text: &str) -> Result<FinanceOutcome> {
        let result = self.builder.build(text, self.confidence_threshold);

        match result.status {
            Status::Ok => self.commit(conversation_id, result).await,
            Status::NeedConfirmation => {
                if let Some(payload) = result.transaction_payload.clone() {
                    self.pending.set(conversation_id, payload).await?;
                }
                Ok(result.into())
            }
            Status::Cancelled | Status::Error => Ok(result.into()),
        }
    }

    async fn commit(&self, conversation_id: &str, result: PipelineResult) -> Result<FinanceOutcome> {
        let transaction_id = match &result.transaction_payload {
            Some(payload) => Some(self.ledger.record(conversation_id, payload.clone()).await?),
            None => None,
        };

        let mut outcome = FinanceOutcome::from(result);
        outcome.action = Some(TurnAction::SaveTransaction);
        outcome.transaction_id = transaction_id;
        Ok(outcome)
    }
}
