//! Topic consumers feeding events into the orchestrator and participants.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use domain::Event;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::bus::InMemoryBus;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::participant::{Participant, ParticipantHandler};
use crate::publisher::Publisher;
use crate::topic::Topic;

/// Spawns a task that decodes every payload of `receiver` and passes it to
/// `handler`, one at a time and in arrival order.
///
/// Decode errors, handler errors and handler panics are logged and counted;
/// the message is then dropped. The task ends when every sender of the channel is gone.
pub fn spawn_consumer<F, Fut, T, E>(
    topic: Topic,
    mut receiver: UnboundedReceiver<Vec<u8>>,
    handler: F,
) -> JoinHandle<()>
where
    F: Fn(Event) -> Fut + Send + 'static,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        tracing::debug!(topic = %topic, "consumer started");
        while let Some(payload) = receiver.recv().await {
            let event = match Event::from_slice(&payload) {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(topic = %topic, error = %e, "failed to decode saga event");
                    metrics::counter!("saga_consumer_errors_total", "topic" => topic.as_str())
                        .increment(1);
                    continue;
                }
            };

            let order_id = event.order_id;
            // Awaited in place so the topic stays ordered; a panic only loses this message.
            match tokio::spawn(handler(event)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::error!(
                        topic = %topic,
                        order_id = %order_id,
                        error = %e,
                        "failed to handle saga event"
                    );
                    metrics::counter!("saga_consumer_errors_total", "topic" => topic.as_str())
                        .increment(1);
                }
                Err(e) => {
                    tracing::error!(
                        topic = %topic,
                        order_id = %order_id,
                        error = %e,
                        "saga event handler panicked"
                    );
                    metrics::counter!("saga_consumer_errors_total", "topic" => topic.as_str())
                        .increment(1);
                }
            }
        }
        tracing::debug!(topic = %topic, "consumer stopped");
    })
}

/// Subscribes the orchestrator to `start-saga`, `orchestrator`,
/// `finish-success` and `finish-fail`.
pub async fn spawn_orchestrator<P>(
    bus: &InMemoryBus,
    orchestrator: Arc<Orchestrator<P>>,
) -> Result<Vec<JoinHandle<()>>>
where
    P: Publisher + 'static,
{
    let mut handles = Vec::with_capacity(4);

    let o = Arc::clone(&orchestrator);
    handles.push(spawn_consumer(
        Topic::StartSaga,
        bus.subscribe(Topic::StartSaga).await?,
        move |event| {
            let o = Arc::clone(&o);
            async move { o.start_saga(event).await }
        },
    ));

    let o = Arc::clone(&orchestrator);
    handles.push(spawn_consumer(
        Topic::Orchestrator,
        bus.subscribe(Topic::Orchestrator).await?,
        move |event| {
            let o = Arc::clone(&o);
            async move { o.continue_saga(event).await }
        },
    ));

    let o = Arc::clone(&orchestrator);
    handles.push(spawn_consumer(
        Topic::FinishSuccess,
        bus.subscribe(Topic::FinishSuccess).await?,
        move |event| {
            let o = Arc::clone(&o);
            async move { o.finish_saga_success(event).await }
        },
    ));

    let o = orchestrator;
    handles.push(spawn_consumer(
        Topic::FinishFail,
        bus.subscribe(Topic::FinishFail).await?,
        move |event| {
            let o = Arc::clone(&o);
            async move { o.finish_saga_fail(event).await }
        },
    ));

    Ok(handles)
}

/// Subscribes a participant to its forward and rollback topics.
pub async fn spawn_participant<T, P>(
    bus: &InMemoryBus,
    handler: Arc<ParticipantHandler<T, P>>,
) -> Result<Vec<JoinHandle<()>>>
where
    T: Participant + 'static,
    P: Publisher + 'static,
{
    let forward = handler.participant().forward_topic();
    let rollback = handler.participant().rollback_topic();

    let h = Arc::clone(&handler);
    let forward_handle = spawn_consumer(forward, bus.subscribe(forward).await?, move |event| {
        let h = Arc::clone(&h);
        async move { h.handle(event).await }
    });

    let h = handler;
    let rollback_handle = spawn_consumer(rollback, bus.subscribe(rollback).await?, move |event| {
        let h = Arc::clone(&h);
        async move { h.handle_rollback(event).await }
    });

    Ok(vec![forward_handle, rollback_handle])
}
