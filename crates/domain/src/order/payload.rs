use chrono::{DateTime, Utc};
use common::{OrderId, TransactionId};
use serde::{Deserialize, Serialize};

use super::OrderError;
use super::value_objects::{Money, OrderProducts};

/// Incoming request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub products: Vec<OrderProducts>,
}

/// The order carried as payload of every saga event.
///
/// `total_amount` and `total_items` stay zero until the payment
/// participant computes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub products: Vec<OrderProducts>,
    pub created_at: DateTime<Utc>,
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub total_items: u32,
}

impl Order {
    /// Creates a new order with a fresh ID and transaction ID.
    pub fn create(request: OrderRequest) -> Result<Self, OrderError> {
        if request.products.is_empty() {
            return Err(OrderError::NoProducts);
        }
        if let Some(line) = request.products.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                code: line.product.code.to_string(),
            });
        }
        if let Some(line) = request
            .products
            .iter()
            .find(|line| line.product.unit_value.is_negative())
        {
            return Err(OrderError::InvalidPrice {
                code: line.product.code.to_string(),
            });
        }

        let order = Self {
            id: OrderId::new(),
            products: request.products,
            created_at: Utc::now(),
            transaction_id: TransactionId::generate(),
            total_amount: Money::zero(),
            total_items: 0,
        };
        if order.compute_total_amount().is_none() || order.compute_total_items().is_none() {
            return Err(OrderError::TotalOverflow);
        }
        Ok(order)
    }

    /// Sum of `quantity * unit_value` over every line, or `None` on overflow.
    pub fn compute_total_amount(&self) -> Option<Money> {
        self.products
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.total_price()?))
    }

    /// Sum of quantities over every line, or `None` on overflow.
    pub fn compute_total_items(&self) -> Option<u32> {
        self.products
            .iter()
            .try_fold(0u32, |acc, line| acc.checked_add(line.quantity))
    }

    /// Stores the computed totals on the order.
    ///
    /// Leaves the order untouched when either total overflows.
    pub fn apply_totals(&mut self) -> Result<(), OrderError> {
        let total_amount = self.compute_total_amount().ok_or(OrderError::TotalOverflow)?;
        let total_items = self.compute_total_items().ok_or(OrderError::TotalOverflow)?;
        self.total_amount = total_amount;
        self.total_items = total_items;
        Ok(())
    }
}
