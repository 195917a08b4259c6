//! Outbound side of the transport.

use std::sync::Arc;

use async_trait::async_trait;
use domain::Event;
use tokio::sync::Mutex;

use crate::error::{Result, SagaError};
use crate::topic::Topic;

/// Hands serialized events to the message transport.
///
/// Delivery is at-least-once from the caller's point of view: a successful
/// return means the transport accepted the payload.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl<T: Publisher + ?Sized> Publisher for Arc<T> {
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        (**self).publish(topic, payload).await
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    published: Vec<(Topic, Vec<u8>)>,
    fail_on_publish: bool,
}

/// Publisher that records every payload instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingPublisher {
    /// Creates a new recording publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject every subsequent publish.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.lock().await.fail_on_publish = fail;
    }

    /// Returns every recorded `(topic, payload)` pair in publish order.
    pub async fn published(&self) -> Vec<(Topic, Vec<u8>)> {
        self.state.lock().await.published.clone()
    }

    /// Returns the topics published to, in order.
    pub async fn topics(&self) -> Vec<Topic> {
        self.state
            .lock()
            .await
            .published
            .iter()
            .map(|(topic, _)| *topic)
            .collect()
    }

    /// Returns the payloads published on one topic.
    pub async fn published_on(&self, topic: Topic) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .await
            .published
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Decodes the most recent payload as an event.
    pub async fn decode_last(&self) -> Option<(Topic, Event)> {
        let state = self.state.lock().await;
        let (topic, payload) = state.published.last()?;
        Event::from_slice(payload).ok().map(|event| (*topic, event))
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_on_publish {
            return Err(SagaError::Publish {
                topic,
                reason: "publisher unavailable".to_string(),
            });
        }
        state.published.push((topic, payload));
        Ok(())
    }
}
