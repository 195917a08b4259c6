//! Inventory participant.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use domain::{Event, EventSource, ProductCode};
use tokio::sync::RwLock;

use super::{DEFAULT_CATALOG, saga_key};
use crate::error::{Result, SagaError};
use crate::participant::Participant;
use crate::topic::Topic;

/// Units of each catalog product the service starts with.
pub const DEFAULT_STOCK: u32 = 10;

/// Stock movement of one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInventory {
    pub order_id: OrderId,
    pub transaction_id: TransactionId,
    pub product_code: ProductCode,
    pub old_quantity: u32,
    pub order_quantity: u32,
    pub new_quantity: u32,
}

impl OrderInventory {
    fn belongs_to(&self, order_id: OrderId, transaction_id: &TransactionId) -> bool {
        self.order_id == order_id && &self.transaction_id == transaction_id
    }
}

#[derive(Debug)]
struct InventoryState {
    stock: HashMap<ProductCode, u32>,
    records: Vec<OrderInventory>,
}

/// Reserves stock for an order and gives it back on compensation.
#[derive(Debug, Clone)]
pub struct InventoryService {
    state: Arc<RwLock<InventoryState>>,
}

impl InventoryService {
    /// Creates a service holding [`DEFAULT_STOCK`] units of every default
    /// catalog product.
    pub fn new() -> Self {
        Self::with_stock(DEFAULT_CATALOG.map(|code| (code, DEFAULT_STOCK)))
    }

    pub fn with_stock<I, C>(stock: I) -> Self
    where
        I: IntoIterator<Item = (C, u32)>,
        C: Into<ProductCode>,
    {
        let state = InventoryState {
            stock: stock
                .into_iter()
                .map(|(code, quantity)| (code.into(), quantity))
                .collect(),
            records: Vec::new(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns the units available for a product.
    pub async fn available(&self, code: &str) -> Option<u32> {
        self.state
            .read()
            .await
            .stock
            .get(&ProductCode::new(code))
            .copied()
    }

    /// Returns the stock movements recorded for a saga.
    pub async fn records(&self, order_id: OrderId, transaction_id: &TransactionId) -> Vec<OrderInventory> {
        self.state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.belongs_to(order_id, transaction_id))
            .cloned()
            .collect()
    }
}

impl Default for InventoryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Participant for InventoryService {
    fn source(&self) -> EventSource {
        EventSource::InventoryService
    }

    fn forward_topic(&self) -> Topic {
        Topic::InventorySuccess
    }

    fn rollback_topic(&self) -> Topic {
        Topic::InventoryFail
    }

    fn name(&self) -> &'static str {
        "inventory"
    }

    fn action(&self) -> &'static str {
        "update inventory"
    }

    async fn execute(&self, event: &mut Event) -> Result<String> {
        let (order_id, transaction_id) = saga_key(&event.payload);
        let mut state = self.state.write().await;
        if state
            .records
            .iter()
            .any(|r| r.belongs_to(order_id, &transaction_id))
        {
            return Err(SagaError::validation(
                "There's another transactionId for this validation",
            ));
        }

        // Check every line before touching the stock so a refused order
        // leaves nothing to compensate.
        let mut working: HashMap<&ProductCode, u32> = HashMap::new();
        let mut movements = Vec::with_capacity(event.payload.products.len());
        for line in &event.payload.products {
            let code = &line.product.code;
            let available = match working.get(code) {
                Some(quantity) => *quantity,
                None => *state
                    .stock
                    .get(code)
                    .ok_or_else(|| SagaError::validation("Inventory not found by informed product"))?,
            };
            let new_quantity = available
                .checked_sub(line.quantity)
                .ok_or_else(|| SagaError::validation("Product is out of stock!"))?;
            working.insert(code, new_quantity);
            movements.push(OrderInventory {
                order_id,
                transaction_id: transaction_id.clone(),
                product_code: code.clone(),
                old_quantity: available,
                order_quantity: line.quantity,
                new_quantity,
            });
        }

        for movement in movements {
            state
                .stock
                .insert(movement.product_code.clone(), movement.new_quantity);
            state.records.push(movement);
        }
        Ok("Inventory updated successfully!".to_string())
    }

    async fn compensate(&self, event: &mut Event) -> Result<String> {
        let (order_id, transaction_id) = saga_key(&event.payload);
        let mut state = self.state.write().await;

        let (restored, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.records)
            .into_iter()
            .partition(|r| r.belongs_to(order_id, &transaction_id));
        state.records = kept;

        for record in restored.iter().rev() {
            let stock = state.stock.entry(record.product_code.clone()).or_default();
            *stock = stock.saturating_add(record.order_quantity);
        }
        tracing::debug!(lines = restored.len(), "inventory restored");
        Ok("Rollback executed for inventory!".to_string())
    }
}
