//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p event-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::OrderId;
use domain::{Event, EventSource, History, Money, Order, OrderProducts, OrderRequest, SagaStatus};
use event_store::{EventFilters, EventStore, EventStoreError, EventStoreExt, PostgresEventStore};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_saga_events_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresEventStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE saga_events")
        .execute(&pool)
        .await
        .unwrap();

    PostgresEventStore::new(pool)
}

fn create_test_event() -> Event {
    let order = Order::create(OrderRequest {
        products: vec![
            OrderProducts::new("BOOKS", Money::from_cents(1500), 2),
            OrderProducts::new("MUSIC", Money::from_cents(999), 1),
        ],
    })
    .unwrap();
    Event::new(order)
}

#[tokio::test]
#[serial]
async fn run_migrations_over_existing_schema() {
    let store = get_test_store().await;

    store.run_migrations().await.unwrap();
    store.run_migrations().await.unwrap();

    let event = create_test_event();
    store.save(&event).await.unwrap();
    assert!(store.find_by_id(event.id).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn save_and_find_by_id() {
    let store = get_test_store().await;
    let event = create_test_event();

    store.save(&event).await.unwrap();

    let found = store.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(found.id, event.id);
    assert_eq!(found.order_id, event.order_id);
    assert_eq!(found.transaction_id, event.transaction_id);
    assert_eq!(found.payload, event.payload);
}

#[tokio::test]
#[serial]
async fn save_upserts_by_id() {
    let store = get_test_store().await;
    let event = create_test_event();
    store.save(&event).await.unwrap();

    let mut finished = event.clone();
    finished.set_outcome(EventSource::Orchestrator, SagaStatus::Fail);
    let finished = finished
        .with_history(History::new(
            EventSource::Orchestrator,
            SagaStatus::Success,
            "Saga started!",
        ))
        .with_history(History::new(
            EventSource::Orchestrator,
            SagaStatus::Fail,
            "Saga finished with errors!",
        ));
    store.save(&finished).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, Some(SagaStatus::Fail));

    let messages: Vec<_> = all[0].history().iter().map(|h| h.message.as_str()).collect();
    assert_eq!(messages, ["Saga started!", "Saga finished with errors!"]);
}

#[tokio::test]
#[serial]
async fn find_all_newest_first() {
    let store = get_test_store().await;
    let mut older = create_test_event();
    older.created_at -= chrono::Duration::minutes(10);
    let newer = create_test_event();

    store.save(&older).await.unwrap();
    store.save(&newer).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, newer.id);
    assert_eq!(all[1].id, older.id);
}

#[tokio::test]
#[serial]
async fn resave_moves_created_at() {
    let store = get_test_store().await;
    let mut older = create_test_event();
    older.created_at -= chrono::Duration::minutes(10);
    let newer = create_test_event();
    store.save(&older).await.unwrap();
    store.save(&newer).await.unwrap();

    older.created_at = newer.created_at + chrono::Duration::minutes(1);
    store.save(&older).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, older.id);
    assert_eq!(all[0].created_at, older.created_at);
}

#[tokio::test]
#[serial]
async fn find_latest_by_filters() {
    let store = get_test_store().await;
    let event = create_test_event();
    let other = create_test_event();
    store.save(&event).await.unwrap();
    store.save(&other).await.unwrap();

    let by_order = store
        .find_latest(&EventFilters::new().order_id(event.order_id))
        .await
        .unwrap();
    assert_eq!(by_order.map(|e| e.id), Some(event.id));

    let by_tx = store
        .find_latest(&EventFilters::new().transaction_id(other.transaction_id.clone()))
        .await
        .unwrap();
    assert_eq!(by_tx.map(|e| e.id), Some(other.id));

    let missing = store
        .find_latest(&EventFilters::new().order_id(OrderId::new()))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[serial]
async fn find_latest_without_filters_fails() {
    let store = get_test_store().await;
    let result = store.find_latest(&EventFilters::new()).await;
    assert!(matches!(result, Err(EventStoreError::EmptyFilters)));
}
