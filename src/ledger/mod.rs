//! Transaction ledger
//!
//! Committed transactions land here once a turn reaches `ok`. The pipeline
//! itself never writes; only the agent layer does.

use crate::models::TransactionPayload;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub transaction_id: Uuid,
    pub conversation_id: String,
    pub payload: TransactionPayload,
    pub recorded_at: DateTime<Utc>,
}

/// Trait for committed-transaction persistence
#[async_trait::async_trait]
pub trait TransactionLedger: Send + Sync {
    async fn record(&self, conversation_id: &str, payload: TransactionPayload) -> Result<Uuid>;
    async fn get(&self, transaction_id: Uuid) -> Result<Option<LedgerEntry>>;
    async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<LedgerEntry>>;
}

/// In-memory ledger for development and tests
pub struct InMemoryLedger {
    entries: Arc<RwLock<HashMap<Uuid, LedgerEntry>>>,
    order: Arc<RwLock<Vec<Uuid>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            order: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TransactionLedger for InMemoryLedger {

    async fn record(&self, conversation_id: &str, payload: TransactionPayload) -> Result<Uuid> {
        let entry = LedgerEntry {
            transaction_id: Uuid::new_v4(),
            conversation_id: conversation_id.to_string(),
            payload,
            recorded_at: Utc::now(),
        };
        let transaction_id = entry.transaction_id;

        info!(
            transaction_id = %transaction_id,
            conversation_id = %conversation_id,
            category = %entry.payload.category,
            direction = %entry.payload.direction,
            "Transaction recorded"
        );

        // lock order: entries, then order
        let mut entries = self.entries.write().await;
        let mut order = self.order.write().await;
        entries.insert(transaction_id, entry);
        order.push(transaction_id);

        Ok(transaction_id)
    }

    async fn get(&self, transaction_id: Uuid) -> Result<Option<LedgerEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&transaction_id).cloned())
    }

    /// Entries for one conversation, oldest first
    async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().await;
        let order = self.order.read().await;

        Ok(order
            .iter()
            .filter_map(|id| entries.get(id))
            .filter(|entry| entry.conversation_id == conversation_id)
            .cloned()
            .collect())
    }
}
