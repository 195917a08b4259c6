use common::{OrderId, TransactionId};

/// Lookup criteria for the latest snapshot of a saga.
///
/// When both are set the order ID wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    /// Filter by order ID.
    pub order_id: Option<OrderId>,

    /// Filter by transaction ID.
    pub transaction_id: Option<TransactionId>,
}

impl EventFilters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by order ID.
    pub fn order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    /// Filters by transaction ID. Blank IDs are ignored.
    pub fn transaction_id(mut self, transaction_id: impl Into<TransactionId>) -> Self {
        let transaction_id = transaction_id.into();
        if !transaction_id.is_blank() {
            self.transaction_id = Some(transaction_id);
        }
        self
    }

    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.transaction_id.is_none()
    }
}
