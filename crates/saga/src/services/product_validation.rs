//! Product validation participant.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use domain::{Event, EventSource, ProductCode};
use tokio::sync::RwLock;

use super::{DEFAULT_CATALOG, SagaKey, saga_key};
use crate::error::{Result, SagaError};
use crate::participant::Participant;
use crate::topic::Topic;

#[derive(Debug)]
struct ValidationState {
    catalog: HashSet<ProductCode>,
    validations: HashMap<SagaKey, bool>,
}

/// Checks that every product of the order exists in the catalog.
///
/// One validation record is kept per saga: `true` once validated, `false`
/// after a rollback.
#[derive(Debug, Clone)]
pub struct ProductValidationService {
    state: Arc<RwLock<ValidationState>>,
}

impl ProductValidationService {
    /// Creates a service with the default catalog.
    pub fn new() -> Self {
        Self::with_catalog(DEFAULT_CATALOG)
    }

    /// Creates a service knowing only the given product codes.
    pub fn with_catalog<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ProductCode>,
    {
        let state = ValidationState {
            catalog: codes.into_iter().map(Into::into).collect(),
            validations: HashMap::new(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns the recorded validation outcome of a saga, if any.
    pub async fn validation(&self, order_id: OrderId, transaction_id: &TransactionId) -> Option<bool> {
        self.state
            .read()
            .await
            .validations
            .get(&(order_id, transaction_id.clone()))
            .copied()
    }

    /// Returns the number of validation records.
    pub async fn validation_count(&self) -> usize {
        self.state.read().await.validations.len()
    }
}

impl Default for ProductValidationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Participant for ProductValidationService {
    fn source(&self) -> EventSource {
        EventSource::ProductValidationService
    }

    fn forward_topic(&self) -> Topic {
        Topic::ProductValidationSuccess
    }

    fn rollback_topic(&self) -> Topic {
        Topic::ProductValidationFail
    }

    fn name(&self) -> &'static str {
        "product validation"
    }

    fn action(&self) -> &'static str {
        "validate products"
    }

    async fn execute(&self, event: &mut Event) -> Result<String> {
        let order = &event.payload;
        if order.products.is_empty() {
            return Err(SagaError::validation("Product list is empty"));
        }
        if order.transaction_id.is_blank() {
            return Err(SagaError::validation(
                "OrderID and TransactionID must be informed",
            ));
        }

        let key = saga_key(order);
        let mut state = self.state.write().await;
        if state.validations.contains_key(&key) {
            return Err(SagaError::validation(
                "There's another transactionId for this validation",
            ));
        }
        for line in &order.products {
            let code = &line.product.code;
            if code.is_blank() {
                return Err(SagaError::validation("Product must be informed"));
            }
            if !state.catalog.contains(code) {
                return Err(SagaError::validation(
                    "Product does not exist in the database",
                ));
            }
        }

        state.validations.insert(key, true);
        Ok("Products are validated successfully!".to_string())
    }

    async fn compensate(&self, event: &mut Event) -> Result<String> {
        let key = saga_key(&event.payload);
        self.state.write().await.validations.insert(key, false);
        Ok("Rollback executed on product validation!".to_string())
    }
}
