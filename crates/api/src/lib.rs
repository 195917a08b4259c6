//! Order service and saga runtime behind an HTTP API.
//!
//! Provides REST endpoints to place orders and inspect their saga
//! snapshots, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod order_service;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryBus, InventoryService, Orchestrator, ParticipantHandler, PaymentService,
    ProductValidationService, SagaCoordinator, SagaError, Topic, spawn_consumer,
    spawn_orchestrator, spawn_participant,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use order_service::OrderService;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub order_service: Arc<OrderService<S, InMemoryBus>>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/order", post(routes::orders::create::<S>))
        .route("/api/event", get(routes::events::find_by_filters::<S>))
        .route("/api/event/all", get(routes::events::find_all::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the bus, the orchestrator, the participants and the order service,
/// and spawns one consumer task per topic.
///
/// Must be called from within a tokio runtime.
pub async fn create_default_state<S: EventStore + 'static>(
    event_store: S,
) -> Result<Arc<AppState<S>>, SagaError> {
    let bus = InMemoryBus::new();

    let orchestrator = Orchestrator::new(bus.clone(), SagaCoordinator::default());
    spawn_orchestrator(&bus, Arc::new(orchestrator)).await?;

    spawn_participant(
        &bus,
        Arc::new(ParticipantHandler::new(
            ProductValidationService::new(),
            bus.clone(),
        )),
    )
    .await?;
    spawn_participant(
        &bus,
        Arc::new(ParticipantHandler::new(PaymentService::new(), bus.clone())),
    )
    .await?;
    spawn_participant(
        &bus,
        Arc::new(ParticipantHandler::new(InventoryService::new(), bus.clone())),
    )
    .await?;

    let order_service = Arc::new(OrderService::new(event_store, bus.clone()));
    let notified = Arc::clone(&order_service);
    spawn_consumer(
        Topic::NotifyEnding,
        bus.subscribe(Topic::NotifyEnding).await?,
        move |event| {
            let service = Arc::clone(&notified);
            async move { service.notify_ending(event).await }
        },
    );

    tracing::info!(topics = Topic::ALL.len(), "saga consumers started");
    Ok(Arc::new(AppState { order_service }))
}
