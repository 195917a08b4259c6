//! Participant contract shared by every local service.

use async_trait::async_trait;
use domain::{Event, EventSource, History, SagaStatus};

use crate::error::Result;
use crate::publisher::Publisher;
use crate::topic::Topic;

/// A service owning one local step of the saga.
///
/// Implementations only perform their local work; recording the outcome on
/// the event and replying to the orchestrator is done by
/// [`ParticipantHandler`].
#[async_trait]
pub trait Participant: Send + Sync {
    /// The source this participant reports as.
    fn source(&self) -> EventSource;

    /// Topic carrying forward requests for this participant.
    fn forward_topic(&self) -> Topic;

    /// Topic carrying compensation requests for this participant.
    fn rollback_topic(&self) -> Topic;

    /// Short name used in rollback failure messages (e.g. `"payment"`).
    fn name(&self) -> &'static str;

    /// What the forward step does, used in failure messages
    /// (e.g. `"realize payment"`).
    fn action(&self) -> &'static str;

    /// Runs the local step and returns the history message on success.
    ///
    /// The participant may enrich the event payload.
    async fn execute(&self, event: &mut Event) -> Result<String>;

    /// Undoes the local step and returns the history message on success.
    async fn compensate(&self, event: &mut Event) -> Result<String>;
}

/// Applies a participant to incoming events and replies to the
/// orchestrator.
///
/// Every handled event gets exactly one new history entry and is published
/// once to [`Topic::Orchestrator`]. A forward failure is reported as
/// `ROLLBACK_PENDING`; a compensation is always reported as `FAIL`.
pub struct ParticipantHandler<T: Participant, P: Publisher> {
    participant: T,
    publisher: P,
}

impl<T: Participant, P: Publisher> ParticipantHandler<T, P> {
    pub fn new(participant: T, publisher: P) -> Self {
        Self {
            participant,
            publisher,
        }
    }

    pub fn participant(&self) -> &T {
        &self.participant
    }

    /// Handles a forward request.
    #[tracing::instrument(skip(self, event), fields(source = %self.participant.source(), order_id = %event.order_id))]
    pub async fn handle(&self, mut event: Event) -> Result<Event> {
        let source = self.participant.source();
        let (status, message) = match self.participant.execute(&mut event).await {
            Ok(message) => {
                tracing::info!("local step succeeded");
                (SagaStatus::Success, message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "local step failed");
                metrics::counter!("saga_participant_failures_total", "source" => source.as_str())
                    .increment(1);
                (
                    SagaStatus::RollbackPending,
                    format!("Fail to {}: {}", self.participant.action(), e),
                )
            }
        };
        self.reply(event, status, message).await
    }

    /// Handles a compensation request.
    #[tracing::instrument(skip(self, event), fields(source = %self.participant.source(), order_id = %event.order_id))]
    pub async fn handle_rollback(&self, mut event: Event) -> Result<Event> {
        let message = match self.participant.compensate(&mut event).await {
            Ok(message) => {
                tracing::info!("compensation executed");
                message
            }
            Err(e) => {
                tracing::error!(error = %e, "compensation failed");
                format!("Rollback not executed for {}: {}", self.participant.name(), e)
            }
        };
        self.reply(event, SagaStatus::Fail, message).await
    }

    async fn reply(&self, mut event: Event, status: SagaStatus, message: String) -> Result<Event> {
        let source = self.participant.source();
        event.set_outcome(source, status);
        let event = event.with_history(History::new(source, status, message));

        let payload = event.to_bytes()?;
        if let Err(e) = self.publisher.publish(Topic::Orchestrator, payload).await {
            tracing::error!(error = %e, "failed to reply to orchestrator");
            return Err(e);
        }
        Ok(event)
    }
}
