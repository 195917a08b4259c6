//! In-process topic bus.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{Result, SagaError};
use crate::publisher::Publisher;
use crate::topic::Topic;

/// One unbounded channel per topic, each with a single consumer.
///
/// Every channel is created up front, so payloads published before the
/// consumer subscribes are buffered until it does. Once the consumer drops
/// its receiver, publishing to that topic fails.
#[derive(Debug, Clone)]
pub struct InMemoryBus {
    senders: Arc<HashMap<Topic, UnboundedSender<Vec<u8>>>>,
    receivers: Arc<Mutex<HashMap<Topic, UnboundedReceiver<Vec<u8>>>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        let mut senders = HashMap::with_capacity(Topic::ALL.len());
        let mut receivers = HashMap::with_capacity(Topic::ALL.len());
        for topic in Topic::ALL {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(topic, tx);
            receivers.insert(topic, rx);
        }
        Self {
            senders: Arc::new(senders),
            receivers: Arc::new(Mutex::new(receivers)),
        }
    }

    /// Takes the receiving end of a topic.
    ///
    /// Fails with `AlreadySubscribed` on the second call for the same topic.
    pub async fn subscribe(&self, topic: Topic) -> Result<UnboundedReceiver<Vec<u8>>> {
        self.receivers
            .lock()
            .await
            .remove(&topic)
            .ok_or(SagaError::AlreadySubscribed(topic))
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let sender = self.senders.get(&topic).ok_or_else(|| SagaError::Publish {
            topic,
            reason: "topic not registered".to_string(),
        })?;
        sender.send(payload).map_err(|_| SagaError::Publish {
            topic,
            reason: "consumer is gone".to_string(),
        })?;
        metrics::counter!("bus_messages_published_total", "topic" => topic.as_str())
            .increment(1);
        Ok(())
    }
}
