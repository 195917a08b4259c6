//! Saga coordinator: decides where an event goes next.

use std::sync::Arc;

use domain::{Event, EventSource, SagaStatus};

use crate::error::{Result, SagaError};
use crate::topic::Topic;
use crate::transition::TransitionTable;

/// Resolves the next topic of a saga event from its `(source, status)`.
///
/// The coordinator is a pure lookup over a [`TransitionTable`]; it never
/// modifies the event.
#[derive(Debug, Clone)]
pub struct SagaCoordinator {
    table: Arc<TransitionTable>,
}

impl SagaCoordinator {
    /// Creates a coordinator over the given table.
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self { table }
    }

    /// Returns the topic the event must be published to.
    ///
    /// Fails with `InvalidState` if the event has no source or status, or
    /// if no rule matches them.
    pub fn next_topic(&self, event: &Event) -> Result<Topic> {
        let (Some(source), Some(status)) = (event.source, event.status) else {
            metrics::counter!("saga_routing_errors_total").increment(1);
            return Err(SagaError::InvalidState(
                "Source and status must be informed.".to_string(),
            ));
        };

        let Some(topic) = self.table.find(source, status) else {
            metrics::counter!("saga_routing_errors_total").increment(1);
            tracing::warn!(
                source = %source,
                status = %status,
                order_id = %event.order_id,
                transaction_id = %event.transaction_id,
                "no transition for event"
            );
            return Err(SagaError::InvalidState(
                "No topic found for source and status.".to_string(),
            ));
        };

        log_current_saga(event, source, status, topic);
        Ok(topic)
    }
}

impl Default for SagaCoordinator {
    fn default() -> Self {
        Self::new(TransitionTable::standard())
    }
}

fn log_current_saga(event: &Event, source: EventSource, status: SagaStatus, next_topic: Topic) {
    let action = match status {
        SagaStatus::Success => "continuing saga",
        SagaStatus::RollbackPending => "rolling back current service",
        SagaStatus::Fail => "rolling back previous service",
    };
    tracing::info!(
        source = %source,
        status = %status,
        next_topic = %next_topic,
        order_id = %event.order_id,
        transaction_id = %event.transaction_id,
        event_id = %event.id,
        "current saga: {action}"
    );
}
