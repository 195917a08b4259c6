//! Named channels events travel on.

use serde::{Deserialize, Serialize};

/// A message topic.
///
/// The wire names are kebab-case (`start-saga`, `payment-fail`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    StartSaga,
    Orchestrator,
    FinishSuccess,
    FinishFail,
    ProductValidationSuccess,
    ProductValidationFail,
    PaymentSuccess,
    PaymentFail,
    InventorySuccess,
    InventoryFail,
    NotifyEnding,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Topic; 11] = [
        Topic::StartSaga,
        Topic::Orchestrator,
        Topic::FinishSuccess,
        Topic::FinishFail,
        Topic::ProductValidationSuccess,
        Topic::ProductValidationFail,
        Topic::PaymentSuccess,
        Topic::PaymentFail,
        Topic::InventorySuccess,
        Topic::InventoryFail,
        Topic::NotifyEnding,
    ];

    /// Returns the wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::StartSaga => "start-saga",
            Topic::Orchestrator => "orchestrator",
            Topic::FinishSuccess => "finish-success",
            Topic::FinishFail => "finish-fail",
            Topic::ProductValidationSuccess => "product-validation-success",
            Topic::ProductValidationFail => "product-validation-fail",
            Topic::PaymentSuccess => "payment-success",
            Topic::PaymentFail => "payment-fail",
            Topic::InventorySuccess => "inventory-success",
            Topic::InventoryFail => "inventory-fail",
            Topic::NotifyEnding => "notify-ending",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown topic name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTopic(pub String);

impl std::fmt::Display for UnknownTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown topic: {}", self.0)
    }
}

impl std::error::Error for UnknownTopic {}

impl std::str::FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}
