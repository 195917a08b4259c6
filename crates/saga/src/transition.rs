//! The routing table of the saga.
//!
//! Each rule maps the `(source, status)` reported by an event to the topic
//! the orchestrator forwards it to. Forward progress runs product validation,
//! payment, inventory. Compensation walks the same chain backwards.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use domain::{EventSource, SagaStatus};

use crate::error::{Result, SagaError};
use crate::topic::Topic;

use EventSource::{InventoryService, Orchestrator, PaymentService, ProductValidationService};
use SagaStatus::{Fail, RollbackPending, Success};

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub source: EventSource,
    pub status: SagaStatus,
    pub topic: Topic,
}

impl TransitionRule {
    pub const fn new(source: EventSource, status: SagaStatus, topic: Topic) -> Self {
        Self {
            source,
            status,
            topic,
        }
    }

    fn matches(&self, source: EventSource, status: SagaStatus) -> bool {
        self.source == source && self.status == status
    }
}

/// The rules of the order saga.
pub const STANDARD_RULES: [TransitionRule; 11] = [
    TransitionRule::new(Orchestrator, Success, Topic::ProductValidationSuccess),
    TransitionRule::new(Orchestrator, Fail, Topic::FinishFail),
    TransitionRule::new(
        ProductValidationService,
        RollbackPending,
        Topic::ProductValidationFail,
    ),
    TransitionRule::new(ProductValidationService, Fail, Topic::FinishFail),
    TransitionRule::new(ProductValidationService, Success, Topic::PaymentSuccess),
    TransitionRule::new(PaymentService, RollbackPending, Topic::PaymentFail),
    TransitionRule::new(PaymentService, Fail, Topic::ProductValidationFail),
    TransitionRule::new(PaymentService, Success, Topic::InventorySuccess),
    TransitionRule::new(InventoryService, RollbackPending, Topic::InventoryFail),
    TransitionRule::new(InventoryService, Fail, Topic::PaymentFail),
    TransitionRule::new(InventoryService, Success, Topic::FinishSuccess),
];

static STANDARD: LazyLock<Arc<TransitionTable>> = LazyLock::new(|| {
    Arc::new(TransitionTable {
        rules: STANDARD_RULES.to_vec(),
    })
});

/// An ordered list of transition rules with no two rules sharing a
/// `(source, status)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
}

impl TransitionTable {
    /// Builds a table, rejecting rules that overlap on `(source, status)`.
    pub fn new(rules: impl IntoIterator<Item = TransitionRule>) -> Result<Self> {
        let rules: Vec<TransitionRule> = rules.into_iter().collect();
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert((rule.source, rule.status)) {
                return Err(SagaError::InvalidState(format!(
                    "Duplicate transition for source {} and status {}.",
                    rule.source, rule.status
                )));
            }
        }
        Ok(Self { rules })
    }

    /// The shared table of the order saga.
    pub fn standard() -> Arc<TransitionTable> {
        Arc::clone(&STANDARD)
    }

    /// Returns the topic of the first rule matching `source` and `status`.
    pub fn find(&self, source: EventSource, status: SagaStatus) -> Option<Topic> {
        self.rules
            .iter()
            .find(|rule| rule.matches(source, status))
            .map(|rule| rule.topic)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
