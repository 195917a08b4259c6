//! Saga error types.

use thiserror::Error;

use crate::topic::Topic;

/// Errors that can occur while routing or handling saga events.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The event cannot be routed, or a transition table is malformed.
    #[error("{0}")]
    InvalidState(String),

    /// A participant refused to execute its local step.
    ///
    /// The message is recorded verbatim in the event history.
    #[error("{0}")]
    ParticipantValidation(String),

    /// Handing an event to the transport failed.
    #[error("Failed to publish to topic '{topic}': {reason}")]
    Publish { topic: Topic, reason: String },

    /// A topic can only have one consumer.
    #[error("Topic '{0}' already has a subscriber")]
    AlreadySubscribed(Topic),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SagaError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ParticipantValidation(message.into())
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
