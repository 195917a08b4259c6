use async_trait::async_trait;
use common::{EventId, OrderId, TransactionId};
use domain::Event;

use crate::{EventFilters, EventStoreError, Result};

/// Storage for full saga event snapshots.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Stores a snapshot, replacing any previous snapshot with the same ID.
    async fn save(&self, event: &Event) -> Result<()>;

    /// Retrieves a snapshot by event ID.
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>>;

    /// Retrieves every snapshot, newest first.
    async fn find_all(&self) -> Result<Vec<Event>>;

    /// Retrieves the newest snapshot for an order.
    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>>;

    /// Retrieves the newest snapshot for a transaction.
    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Event>>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Finds the newest snapshot matching the filters.
    ///
    /// The order ID is used when present, the transaction ID otherwise.
    /// Fails with `EmptyFilters` if neither is set.
    async fn find_latest(&self, filters: &EventFilters) -> Result<Option<Event>> {
        if let Some(order_id) = filters.order_id {
            return self.find_latest_by_order_id(order_id).await;
        }
        if let Some(transaction_id) = &filters.transaction_id {
            return self.find_latest_by_transaction_id(transaction_id).await;
        }
        Err(EventStoreError::EmptyFilters)
    }

    /// Checks if a snapshot with the given ID exists.
    async fn exists(&self, id: EventId) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}
