//! Payment participant.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use domain::{Event, EventSource, Money};
use tokio::sync::RwLock;

use super::{SagaKey, saga_key};
use crate::error::{Result, SagaError};
use crate::participant::Participant;
use crate::topic::Topic;

/// Smallest amount the payment service accepts.
pub const MIN_AMOUNT: Money = Money::from_cents(10);

/// Lifecycle of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Refund,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Refund => "REFUND",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment taken for one saga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub order_id: OrderId,
    pub transaction_id: TransactionId,
    pub total_amount: Money,
    pub total_items: u32,
    pub status: PaymentStatus,
}

#[derive(Debug, Default)]
struct PaymentState {
    payments: HashMap<SagaKey, Payment>,
    fail_on_charge: bool,
}

/// Charges the order total and refunds it on compensation.
///
/// The computed totals are written back into the event payload.
#[derive(Debug, Clone, Default)]
pub struct PaymentService {
    state: Arc<RwLock<PaymentState>>,
}

impl PaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline every subsequent charge.
    pub async fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().await.fail_on_charge = fail;
    }

    /// Returns the payment recorded for a saga, if any.
    pub async fn payment(&self, order_id: OrderId, transaction_id: &TransactionId) -> Option<Payment> {
        self.state
            .read()
            .await
            .payments
            .get(&(order_id, transaction_id.clone()))
            .cloned()
    }

    /// Returns the number of recorded payments.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }
}

#[async_trait]
impl Participant for PaymentService {
    fn source(&self) -> EventSource {
        EventSource::PaymentService
    }

    fn forward_topic(&self) -> Topic {
        Topic::PaymentSuccess
    }

    fn rollback_topic(&self) -> Topic {
        Topic::PaymentFail
    }

    fn name(&self) -> &'static str {
        "payment"
    }

    fn action(&self) -> &'static str {
        "realize payment"
    }

    async fn execute(&self, event: &mut Event) -> Result<String> {
        let key = saga_key(&event.payload);
        let mut state = self.state.write().await;
        if state.payments.contains_key(&key) {
            return Err(SagaError::validation(
                "There's another transactionId for this validation",
            ));
        }

        event
            .payload
            .apply_totals()
            .map_err(|e| SagaError::validation(e.to_string()))?;
        let order = &event.payload;
        let mut payment = Payment {
            order_id: order.id,
            transaction_id: order.transaction_id.clone(),
            total_amount: order.total_amount,
            total_items: order.total_items,
            status: PaymentStatus::Pending,
        };

        // Rejected payments stay recorded as pending.
        let rejection = if state.fail_on_charge {
            Some("Payment declined".to_string())
        } else if payment.total_amount < MIN_AMOUNT {
            Some(format!(
                "The amount is less than the minimum available: {}",
                MIN_AMOUNT.cents() as f64 / 100.0
            ))
        } else {
            None
        };
        if let Some(reason) = rejection {
            state.payments.insert(key, payment);
            return Err(SagaError::validation(reason));
        }

        payment.status = PaymentStatus::Success;
        tracing::debug!(amount = %payment.total_amount, items = payment.total_items, "payment realized");
        state.payments.insert(key, payment);
        Ok("Payment realized successfully!".to_string())
    }

    async fn compensate(&self, event: &mut Event) -> Result<String> {
        let key = saga_key(&event.payload);
        let mut state = self.state.write().await;
        let payment = state.payments.get_mut(&key).ok_or_else(|| {
            SagaError::validation("Payment not found by orderID and transactionID")
        })?;

        payment.status = PaymentStatus::Refund;
        event.payload.total_amount = payment.total_amount;
        event.payload.total_items = payment.total_items;
        Ok("Rollback executed for payment!".to_string())
    }
}
