//! Who reported an event, and with what outcome.

use serde::{Deserialize, Serialize};

/// The party that most recently produced a saga event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    Orchestrator,
    ProductValidationService,
    PaymentService,
    InventoryService,
}

impl EventSource {
    /// Every source, orchestrator first then participants in saga order.
    pub const ALL: [EventSource; 4] = [
        EventSource::Orchestrator,
        EventSource::ProductValidationService,
        EventSource::PaymentService,
        EventSource::InventoryService,
    ];

    /// Returns the wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Orchestrator => "ORCHESTRATOR",
            EventSource::ProductValidationService => "PRODUCT_VALIDATION_SERVICE",
            EventSource::PaymentService => "PAYMENT_SERVICE",
            EventSource::InventoryService => "INVENTORY_SERVICE",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the most recent saga step.
///
/// ```text
/// SUCCESS ──────────► next participant
/// ROLLBACK_PENDING ─► reporting participant's own rollback
/// FAIL ─────────────► previous participant's rollback
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaStatus {
    Success,
    RollbackPending,
    Fail,
}

impl SagaStatus {
    pub const ALL: [SagaStatus; 3] = [
        SagaStatus::Success,
        SagaStatus::RollbackPending,
        SagaStatus::Fail,
    ];

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::Success => "SUCCESS",
            SagaStatus::RollbackPending => "ROLLBACK_PENDING",
            SagaStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_wire_names_match_serde() {
        for source in EventSource::ALL {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
        }
    }

    #[test]
    fn test_status_wire_names_match_serde() {
        for status in SagaStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(EventSource::PaymentService.to_string(), "PAYMENT_SERVICE");
        assert_eq!(SagaStatus::RollbackPending.to_string(), "ROLLBACK_PENDING");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<SagaStatus>("\"COMPLETED\"").is_err());
    }
}
