use std::sync::Arc;

use async_trait::async_trait;
use common::{EventId, OrderId, TransactionId};
use domain::Event;
use tokio::sync::RwLock;

use crate::{Result, store::EventStore};

/// In-memory event store implementation for testing.
///
/// Snapshots are kept in insertion order; saving an event whose ID is
/// already stored replaces it in place.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of snapshots stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clears all snapshots.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }

    async fn latest_matching(&self, predicate: impl Fn(&Event) -> bool) -> Option<Event> {
        let store = self.events.read().await;
        store
            .iter()
            .filter(|e| predicate(e))
            .max_by_key(|e| e.created_at)
            .cloned()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn save(&self, event: &Event) -> Result<()> {
        let mut store = self.events.write().await;
        match store.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event.clone(),
            None => store.push(event.clone()),
        }
        metrics::counter!("event_store_snapshots_saved").increment(1);
        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        let store = self.events.read().await;
        Ok(store.iter().find(|e| e.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let store = self.events.read().await;
        let mut events = store.clone();
        // Stable sort on reversed input keeps later inserts first on ties.
        events.reverse();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>> {
        Ok(self.latest_matching(|e| e.order_id == order_id).await)
    }

    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Event>> {
        Ok(self
            .latest_matching(|e| &e.transaction_id == transaction_id)
            .await)
    }
}
