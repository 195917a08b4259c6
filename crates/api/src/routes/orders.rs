//! Order creation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Event, OrderRequest};
use event_store::EventStore;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/order: create an order and start its saga.
#[tracing::instrument(skip(state, request))]
pub async fn create<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.order_service.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}
