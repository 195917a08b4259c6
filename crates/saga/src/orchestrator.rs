//! The orchestrator: starts, routes and ends sagas.

use domain::{Event, EventSource, History, SagaStatus};

use crate::coordinator::SagaCoordinator;
use crate::error::Result;
use crate::publisher::Publisher;
use crate::topic::Topic;

/// Drives a saga by publishing each event to the topic its coordinator
/// resolves.
///
/// Every operation returns the event exactly as it was published. The next
/// topic is resolved before anything is appended to the history, so a
/// routing failure leaves the event untouched.
pub struct Orchestrator<P: Publisher> {
    publisher: P,
    coordinator: SagaCoordinator,
}

impl<P: Publisher> Orchestrator<P> {
    pub fn new(publisher: P, coordinator: SagaCoordinator) -> Self {
        Self {
            publisher,
            coordinator,
        }
    }

    /// Starts a saga for a freshly created order event.
    ///
    /// Any source and status already on the event are overwritten.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, transaction_id = %event.transaction_id))]
    pub async fn start_saga(&self, mut event: Event) -> Result<Event> {
        event.set_outcome(EventSource::Orchestrator, SagaStatus::Success);
        let topic = self.coordinator.next_topic(&event)?;
        tracing::info!(next_topic = %topic, "saga started");

        let event = event.with_history(History::new(
            EventSource::Orchestrator,
            SagaStatus::Success,
            "Saga started!",
        ));
        self.send(&event, topic).await?;

        metrics::counter!("saga_started_total").increment(1);
        Ok(event)
    }

    /// Forwards a participant's reply to the next topic.
    ///
    /// The history is left as the participant wrote it.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, transaction_id = %event.transaction_id))]
    pub async fn continue_saga(&self, event: Event) -> Result<Event> {
        let topic = self.coordinator.next_topic(&event)?;
        self.send(&event, topic).await?;

        metrics::counter!("saga_continued_total").increment(1);
        Ok(event)
    }

    /// Ends a saga whose every step succeeded.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, transaction_id = %event.transaction_id))]
    pub async fn finish_saga_success(&self, event: Event) -> Result<Event> {
        let event = self
            .finish(event, SagaStatus::Success, "Saga finished successfully!")
            .await?;
        tracing::info!("saga finished successfully");
        metrics::counter!("saga_finished_total", "outcome" => "success").increment(1);
        Ok(event)
    }

    /// Ends a saga after compensation reached the first step.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, transaction_id = %event.transaction_id))]
    pub async fn finish_saga_fail(&self, event: Event) -> Result<Event> {
        let event = self
            .finish(event, SagaStatus::Fail, "Saga finished with errors!")
            .await?;
        tracing::warn!("saga finished with errors");
        metrics::counter!("saga_finished_total", "outcome" => "fail").increment(1);
        Ok(event)
    }

    async fn finish(&self, mut event: Event, status: SagaStatus, message: &str) -> Result<Event> {
        event.set_outcome(EventSource::Orchestrator, status);
        let event = event.with_history(History::new(EventSource::Orchestrator, status, message));
        self.send(&event, Topic::NotifyEnding).await?;
        Ok(event)
    }

    async fn send(&self, event: &Event, topic: Topic) -> Result<()> {
        let payload = event.to_bytes()?;
        if let Err(e) = self.publisher.publish(topic, payload).await {
            tracing::error!(topic = %topic, error = %e, "failed to publish saga event");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SagaError;
    use crate::publisher::RecordingPublisher;
    use domain::{Money, Order, OrderProducts, OrderRequest};

    fn setup() -> (Orchestrator<RecordingPublisher>, RecordingPublisher) {
        let publisher = RecordingPublisher::new();
        let orchestrator = Orchestrator::new(publisher.clone(), SagaCoordinator::default());
        (orchestrator, publisher)
    }

    fn new_event() -> Event {
        let order = Order::create(OrderRequest {
            products: vec![OrderProducts::new("BOOKS", Money::from_cents(1000), 2)],
        })
        .unwrap();
        Event::new(order)
    }

    fn reply(source: EventSource, status: SagaStatus, message: &str) -> Event {
        let mut event = new_event();
        event.set_outcome(source, status);
        event.with_history(History::new(source, status, message))
    }

    #[tokio::test]
    async fn test_start_saga() {
        let (orchestrator, publisher) = setup();
        let event = new_event();

        let started = orchestrator.start_saga(event.clone()).await.unwrap();

        assert_eq!(started.source, Some(EventSource::Orchestrator));
        assert_eq!(started.status, Some(SagaStatus::Success));
        assert_eq!(started.history().len(), 1);
        assert_eq!(started.history()[0].message, "Saga started!");
        assert_eq!(started.order_id, event.order_id);
        assert_eq!(started.transaction_id, event.transaction_id);

        let (topic, published) = publisher.decode_last().await.unwrap();
        assert_eq!(topic, Topic::ProductValidationSuccess);
        assert_eq!(published, started);
    }

    #[tokio::test]
    async fn test_start_saga_overwrites_source_and_status() {
        let (orchestrator, publisher) = setup();
        let mut event = new_event();
        event.set_outcome(EventSource::InventoryService, SagaStatus::Fail);

        let started = orchestrator.start_saga(event).await.unwrap();

        assert_eq!(started.source, Some(EventSource::Orchestrator));
        assert_eq!(started.status, Some(SagaStatus::Success));
        assert_eq!(
            publisher.topics().await,
            vec![Topic::ProductValidationSuccess]
        );
    }

    #[tokio::test]
    async fn test_continue_saga_after_validation_success() {
        let (orchestrator, publisher) = setup();
        let event = reply(
            EventSource::ProductValidationService,
            SagaStatus::Success,
            "Products are validated successfully!",
        );

        let continued = orchestrator.continue_saga(event.clone()).await.unwrap();

        assert_eq!(continued, event);
        assert_eq!(publisher.topics().await, vec![Topic::PaymentSuccess]);
    }

    #[tokio::test]
    async fn test_continue_saga_after_inventory_failure() {
        let (orchestrator, publisher) = setup();
        let event = reply(
            EventSource::InventoryService,
            SagaStatus::Fail,
            "Rollback executed for inventory!",
        );

        orchestrator.continue_saga(event).await.unwrap();

        assert_eq!(publisher.topics().await, vec![Topic::PaymentFail]);
    }

    #[tokio::test]
    async fn test_continue_saga_without_route_publishes_nothing() {
        let (orchestrator, publisher) = setup();
        let mut event = new_event();
        event.set_outcome(EventSource::Orchestrator, SagaStatus::RollbackPending);

        let err = orchestrator.continue_saga(event).await.unwrap_err();

        assert!(matches!(err, SagaError::InvalidState(_)));
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_continue_saga_requires_source_and_status() {
        let (orchestrator, publisher) = setup();

        let err = orchestrator.continue_saga(new_event()).await.unwrap_err();

        assert_eq!(err.to_string(), "Source and status must be informed.");
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_finish_saga_success() {
        let (orchestrator, publisher) = setup();
        let event = reply(
            EventSource::InventoryService,
            SagaStatus::Success,
            "Inventory updated successfully!",
        );

        let finished = orchestrator.finish_saga_success(event).await.unwrap();

        assert_eq!(finished.source, Some(EventSource::Orchestrator));
        assert_eq!(finished.status, Some(SagaStatus::Success));
        assert_eq!(finished.history().len(), 2);
        assert_eq!(
            finished.last_history().unwrap().message,
            "Saga finished successfully!"
        );

        let (topic, published) = publisher.decode_last().await.unwrap();
        assert_eq!(topic, Topic::NotifyEnding);
        assert_eq!(published, finished);
    }

    #[tokio::test]
    async fn test_finish_saga_fail() {
        let (orchestrator, publisher) = setup();
        let event = reply(
            EventSource::ProductValidationService,
            SagaStatus::Fail,
            "Rollback executed on product validation!",
        );

        let finished = orchestrator.finish_saga_fail(event).await.unwrap();

        assert_eq!(finished.status, Some(SagaStatus::Fail));
        let last = finished.last_history().unwrap();
        assert_eq!(last.source, EventSource::Orchestrator);
        assert_eq!(last.status, SagaStatus::Fail);
        assert_eq!(last.message, "Saga finished with errors!");
        assert_eq!(publisher.topics().await, vec![Topic::NotifyEnding]);
    }

    #[tokio::test]
    async fn test_publish_failure_is_surfaced() {
        let (orchestrator, publisher) = setup();
        publisher.set_fail_on_publish(true).await;

        let err = orchestrator.start_saga(new_event()).await.unwrap_err();

        assert!(matches!(
            err,
            SagaError::Publish {
                topic: Topic::ProductValidationSuccess,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_history_only_grows() {
        let (orchestrator, _publisher) = setup();

        let started = orchestrator.start_saga(new_event()).await.unwrap();
        let mut reply = started.clone();
        reply.set_outcome(EventSource::ProductValidationService, SagaStatus::Success);
        let reply = reply.with_history(History::new(
            EventSource::ProductValidationService,
            SagaStatus::Success,
            "Products are validated successfully!",
        ));
        let continued = orchestrator.continue_saga(reply).await.unwrap();
        let finished = orchestrator.finish_saga_fail(continued.clone()).await.unwrap();

        assert_eq!(started.history().len(), 1);
        assert_eq!(continued.history().len(), 2);
        assert_eq!(finished.history().len(), 3);
        assert_eq!(&finished.history()[..2], continued.history());
    }
}
