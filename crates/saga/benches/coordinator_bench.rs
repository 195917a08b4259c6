use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Event, EventSource, Money, Order, OrderProducts, OrderRequest, SagaStatus};
use saga::{Orchestrator, RecordingPublisher, SagaCoordinator};

fn make_event(source: EventSource, status: SagaStatus) -> Event {
    let order = Order::create(OrderRequest {
        products: vec![OrderProducts::new("BOOKS", Money::from_cents(1000), 2)],
    })
    .unwrap();
    let mut event = Event::new(order);
    event.set_outcome(source, status);
    event
}

fn bench_next_topic(c: &mut Criterion) {
    let coordinator = SagaCoordinator::default();
    let event = make_event(EventSource::InventoryService, SagaStatus::Success);

    c.bench_function("coordinator/next_topic", |b| {
        b.iter(|| coordinator.next_topic(&event).unwrap());
    });
}

fn bench_continue_saga(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = Orchestrator::new(RecordingPublisher::new(), SagaCoordinator::default());
    let event = make_event(EventSource::PaymentService, SagaStatus::Success);

    c.bench_function("orchestrator/continue_saga", |b| {
        b.iter(|| {
            rt.block_on(async {
                orchestrator.continue_saga(event.clone()).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_next_topic, bench_continue_saga);
criterion_main!(benches);
