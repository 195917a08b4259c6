//! Saga snapshot queries.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::OrderId;
use domain::Event;
use event_store::{EventFilters, EventStore};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
}

impl EventQuery {
    fn into_filters(self) -> Result<EventFilters, ApiError> {
        let mut filters = EventFilters::new();
        if let Some(order_id) = self.order_id.filter(|id| !id.trim().is_empty()) {
            let order_id: OrderId = order_id
                .parse()
                .map_err(|e| ApiError::BadRequest(format!("Invalid orderId: {e}")))?;
            filters = filters.order_id(order_id);
        }
        if let Some(transaction_id) = self.transaction_id {
            filters = filters.transaction_id(transaction_id);
        }
        Ok(filters)
    }
}

/// GET /api/event: latest snapshot by orderId or transactionId.
#[tracing::instrument(skip(state))]
pub async fn find_by_filters<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Event>, ApiError> {
    let filters = query.into_filters()?;
    let event = state.order_service.find_by_filters(&filters).await?;
    Ok(Json(event))
}

/// GET /api/event/all: every snapshot, newest first.
#[tracing::instrument(skip(state))]
pub async fn find_all<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.order_service.find_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_ignored() {
        let query = EventQuery {
            order_id: Some(" ".to_string()),
            transaction_id: Some(String::new()),
        };
        assert!(query.into_filters().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_order_id_is_rejected() {
        let query = EventQuery {
            order_id: Some("not-a-uuid".to_string()),
            transaction_id: None,
        };
        assert!(matches!(query.into_filters(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_order_id_is_parsed() {
        let order_id = OrderId::new();
        let query = EventQuery {
            order_id: Some(order_id.to_string()),
            transaction_id: Some("1700000000000_abc".to_string()),
        };
        let filters = query.into_filters().unwrap();
        assert_eq!(filters.order_id, Some(order_id));
        assert!(filters.transaction_id.is_some());
    }
}
