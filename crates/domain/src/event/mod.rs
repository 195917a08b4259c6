//! The saga event exchanged between the orchestrator and its participants.

mod status;

pub use status::{EventSource, SagaStatus};

use chrono::{DateTime, Utc};
use common::{EventId, OrderId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::order::Order;

/// One entry of an event's execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub source: EventSource,
    pub status: SagaStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl History {
    /// Creates a history entry stamped with the current time.
    pub fn new(source: EventSource, status: SagaStatus, message: impl Into<String>) -> Self {
        Self {
            source,
            status,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// A saga event.
///
/// `transaction_id` and `order_id` form the saga's correlation key and never
/// change. The history is append-only: entries can be added through
/// [`Event::push_history`] or [`Event::with_history`] but never removed or
/// edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub transaction_id: TransactionId,
    pub order_id: OrderId,
    pub payload: Order,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub status: Option<SagaStatus>,
    #[serde(default)]
    event_history: Vec<History>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates the initial event of a saga for the given order.
    ///
    /// Source and status are left unset; only the orchestrator assigns them
    /// when the saga starts.
    pub fn new(order: Order) -> Self {
        Self {
            id: EventId::new(),
            transaction_id: order.transaction_id.clone(),
            order_id: order.id,
            payload: order,
            source: None,
            status: None,
            event_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The execution trace, oldest entry first.
    pub fn history(&self) -> &[History] {
        &self.event_history
    }

    /// The most recent history entry.
    pub fn last_history(&self) -> Option<&History> {
        self.event_history.last()
    }

    /// Sets who reported the event and with what outcome.
    pub fn set_outcome(&mut self, source: EventSource, status: SagaStatus) {
        self.source = Some(source);
        self.status = Some(status);
    }

    /// Appends an entry to the history.
    ///
    /// Timestamps never go backwards within one event: an entry older than
    /// the current last entry is stamped with the last entry's time.
    pub fn push_history(&mut self, mut entry: History) {
        if let Some(last) = self.event_history.last()
            && entry.created_at < last.created_at
        {
            entry.created_at = last.created_at;
        }
        self.event_history.push(entry);
    }

    /// Consumes the event and returns it with `entry` appended.
    pub fn with_history(mut self, entry: History) -> Self {
        self.push_history(entry);
        self
    }

    /// Serializes the event to its JSON wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses an event from its JSON wire form.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
