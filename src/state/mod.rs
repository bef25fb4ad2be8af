//! Pending-transaction state
//!
//! At most one unconfirmed payload per slot. `set` overwrites, no merging
//! or queuing. [`PendingSlot`] is the bare single slot; [`PendingStore`]
//! keys slots by conversation so concurrent users cannot clobber each
//! other's pending transaction.

use crate::models::TransactionPayload;
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;
use tracing::debug;

/// Single mutually-exclusive slot holding at most one pending payload
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<TransactionPayload>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still holds a valid Option; keep serving it.
    fn lock(&self) -> MutexGuard<'_, Option<TransactionPayload>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn has_pending(&self) -> bool {
        self.lock().is_some()
    }

    pub fn set(&self, payload: TransactionPayload) {
        *self.lock() = Some(payload);
    }

    pub fn get(&self) -> Option<TransactionPayload> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Remove and return the pending payload in one step.
    pub fn take(&self) -> Option<TransactionPayload> {
        self.lock().take()
    }
}

/// Trait for pending-transaction persistence, keyed by conversation
#[async_trait::async_trait]
pub trait PendingStore: Send + Sync {
    async fn has_pending(&self, conversation_id: &str) -> Result<bool>;
    async fn set(&self, conversation_id: &str, payload: TransactionPayload) -> Result<()>;
    async fn get(&self, conversation_id: &str) -> Result<Option<TransactionPayload>>;
    async fn clear(&self, conversation_id: &str) -> Result<()>;
}

/// In-memory store: one [`PendingSlot`] per conversation.
///
/// Slots are touched only while the map lock is held, and `clear` drops the
/// entry, so the map holds exactly the conversations with something pending.
pub struct InMemoryPendingStore {
    slots: Arc<RwLock<HashMap<String, Arc<PendingSlot>>>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of conversations currently holding a pending payload.
    pub async fn pending_count(&self) -> usize {
        let slots = self.slots.read().await;
        slots.values().filter(|slot| slot.has_pending()).count()
    }

    /// Number of conversation entries held in memory.
    pub async fn conversation_count(&self) -> usize {
        self.slots.read().await.len()
    }
}

impl Default for InMemoryPendingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PendingStore for InMemoryPendingStore {

    async fn has_pending(&self, conversation_id: &str) -> Result<bool> {
        let slots = self.slots.read().await;
        Ok(slots
            .get(conversation_id)
            .map(|slot| slot.has_pending())
            .unwrap_or(false))
    }

    async fn set(&self, conversation_id: &str, payload: TransactionPayload) -> Result<()> {
        let mut slots = self.slots.write().await;
        slots
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(PendingSlot::new()))
            .set(payload);
        debug!(conversation_id = %conversation_id, "Pending transaction stored");
        Ok(())
    }

    async fn get(&self, conversation_id: &str) -> Result<Option<TransactionPayload>> {
        let slots = self.slots.read().await;
        Ok(slots.get(conversation_id).and_then(|slot| slot.get()))
    }

    async fn clear(&self, conversation_id: &str) -> Result<()> {
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.remove(conversation_id) {
            slot.clear();
            debug!(conversation_id = %conversation_id, "Pending transaction cleared");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<T> PendingStore for Arc<T>
where
    T: PendingStore + ?Sized,
{
    async fn has_pending(&self, conversation_id: &str) -> Result<bool> {
        (**self).has_pending(conversation_id).await
    }

    async fn set(&self, conversation_id: &str, payload: TransactionPayload) -> Result<()> {
        (**self).set(conversation_id, payload).await
    }

    async fn get(&self, conversation_id: &str) -> Result<Option<TransactionPayload>> {
        (**self).get(conversation_id).await
    }

    async fn clear(&self, conversation_id: &str) -> Result<()> {
        (**self).clear(conversation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ConfidenceSource, Direction};

    fn payload(raw_text: &str) -> TransactionPayload {
        TransactionPayload {
            amount: None,
            currency: "BRL".to_string(),
            direction: Direction::Expense,
            category: Category::Outros,
            confidence: 0.1,
            confidence_source: ConfidenceSource::Classifier,
            description: raw_text.to_string(),
            raw_text: raw_text.to_string(),
            ts_iso: "2026-10-19T10:00:00-03:00".to_string(),
        }
    }

    #[test]
    fn test_slot_round_trip() {
        let slot = PendingSlot::new();
        assert!(!slot.has_pending());

        let p = payload("gastei no mercado");
        slot.set(p.clone());
        assert!(slot.has_pending());
        assert_eq!(slot.get(), Some(p));

        slot.clear();
        assert!(!slot.has_pending());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_slot_set_overwrites() {
        let slot = PendingSlot::new();
        slot.set(payload("primeiro"));
        slot.set(payload("segundo"));
        assert_eq!(slot.take().unwrap().raw_text, "segundo");
        assert!(!slot.has_pending());
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = InMemoryPendingStore::new();
        let p = payload("uber");

        store.set("5511999990000", p.clone()).await.unwrap();
        assert!(store.has_pending("5511999990000").await.unwrap());
        assert_eq!(store.get("5511999990000").await.unwrap(), Some(p));

        store.clear("5511999990000").await.unwrap();
        assert!(!store.has_pending("5511999990000").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_isolates_conversations() {
        let store = InMemoryPendingStore::new();
        store.set("ana", payload("cinema")).await.unwrap();
        store.set("bruno", payload("farmácia")).await.unwrap();

        store.clear("ana").await.unwrap();

        assert!(!store.has_pending("ana").await.unwrap());
        assert_eq!(store.get("bruno").await.unwrap().unwrap().raw_text, "farmácia");
        assert_eq!(store.pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let store = InMemoryPendingStore::new();
        assert!(!store.has_pending("ninguém").await.unwrap());
        assert_eq!(store.get("ninguém").await.unwrap(), None);
        store.clear("ninguém").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_conversations() {
        let store = Arc::new(InMemoryPendingStore::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("user-{}", i);
                store.set(&id, payload(&id)).await.unwrap();
                store.get(&id).await.unwrap().unwrap().raw_text
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), format!("user-{}", i));
        }
        assert_eq!(store.pending_count().await, 16);
    }

    #[tokio::test]
    async fn test_clear_drops_conversation_entry() {
        let store = InMemoryPendingStore::new();
        for i in 0..50 {
            let id = format!("user-{}", i);
            store.set(&id, payload(&id)).await.unwrap();
            store.clear(&id).await.unwrap();
        }

        assert_eq!(store.pending_count().await, 0);
        assert_eq!(store.conversation_count().await, 0);
    }

    #[test]
    fn test_slot_shared_across_threads() {
        let slot = Arc::new(PendingSlot::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let slot = slot.clone();
                std::thread::spawn(move || {
                    slot.set(payload(&format!("t-{}", i)));
                    slot.get().is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert!(slot.take().unwrap().raw_text.starts_with("t-"));
        assert!(!slot.has_pending());
    }
}
