//! Order service: opens sagas and keeps their final snapshots.

use chrono::Utc;
use domain::{DomainError, Event, Order, OrderRequest};
use event_store::{EventFilters, EventStore, EventStoreError, EventStoreExt};
use saga::{Publisher, SagaError, Topic};
use thiserror::Error;

/// Errors raised by the order service.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    #[error(transparent)]
    Saga(#[from] SagaError),

    #[error("Event not found by orderID or transactionID")]
    NotFound,
}

/// Creates orders, starts their sagas and serves stored snapshots.
pub struct OrderService<S: EventStore, P: Publisher> {
    store: S,
    publisher: P,
}

impl<S: EventStore, P: Publisher> OrderService<S, P> {
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Creates an order, stores its initial event and starts the saga.
    #[tracing::instrument(skip(self, request), fields(products = request.products.len()))]
    pub async fn create_order(&self, request: OrderRequest) -> Result<Event, OrderServiceError> {
        let order = Order::create(request).map_err(DomainError::from)?;
        let event = Event::new(order);
        let payload = event.to_bytes().map_err(DomainError::from)?;

        // Stored before the saga starts so the final snapshot always lands last.
        self.store.save(&event).await?;
        self.publisher.publish(Topic::StartSaga, payload).await?;

        tracing::info!(
            order_id = %event.order_id,
            transaction_id = %event.transaction_id,
            "order created"
        );
        metrics::counter!("orders_created_total").increment(1);
        Ok(event)
    }

    /// Stores the final snapshot of a saga.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn notify_ending(&self, mut event: Event) -> Result<Event, OrderServiceError> {
        event.created_at = Utc::now();
        self.store.save(&event).await?;

        tracing::info!(
            transaction_id = %event.transaction_id,
            status = ?event.status,
            "order saga ended"
        );
        Ok(event)
    }

    /// Every stored snapshot, newest first.
    pub async fn find_all(&self) -> Result<Vec<Event>, OrderServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// The newest snapshot matching the filters.
    pub async fn find_by_filters(&self, filters: &EventFilters) -> Result<Event, OrderServiceError> {
        self.store
            .find_latest(filters)
            .await?
            .ok_or(OrderServiceError::NotFound)
    }
}
