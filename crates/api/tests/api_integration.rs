//! Integration tests for the API server.

use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup() -> axum::Router {
    let state = api::create_default_state(InMemoryEventStore::new())
        .await
        .unwrap();
    api::create_app(state, get_metrics_handle())
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_order(products: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/order")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "products": products })).unwrap(),
        ))
        .unwrap()
}

/// Polls the snapshot of an order until the saga has ended.
async fn wait_for_ending(app: &axum::Router, order_id: &str) -> Value {
    for _ in 0..200 {
        let (status, json) = send(app, get(&format!("/api/event?orderId={order_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let ended = json["eventHistory"]
            .as_array()
            .and_then(|history| history.last())
            .and_then(|entry| entry["message"].as_str())
            .is_some_and(|message| message.starts_with("Saga finished"));
        if ended {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("saga for order {order_id} did not finish in time");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_create_order_returns_initial_event() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        post_order(json!([
            { "product": { "code": "BOOKS", "unitValue": 1500 }, "quantity": 2 }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].is_string());
    assert_eq!(json["orderId"], json["payload"]["id"]);
    assert_eq!(json["transactionId"], json["payload"]["transactionId"]);
    assert!(json["source"].is_null());
    assert!(json["status"].is_null());
    assert_eq!(json["eventHistory"], json!([]));
}

#[tokio::test]
async fn test_create_order_without_products_is_rejected() {
    let app = setup().await;

    let (status, json) = send(&app, post_order(json!([]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_create_order_with_overflowing_total_is_rejected() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        post_order(json!([
            { "product": { "code": "BOOKS", "unitValue": i64::MAX }, "quantity": 2 }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Order error: Order total is too large");
}

#[tokio::test]
async fn test_create_order_with_negative_unit_value_is_rejected() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        post_order(json!([
            { "product": { "code": "BOOKS", "unitValue": -100 }, "quantity": 1 }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Order error: Invalid unit value for product BOOKS (must not be negative)"
    );
}

#[tokio::test]
async fn test_successful_order_saga() {
    let app = setup().await;

    let (_, created) = send(
        &app,
        post_order(json!([
            { "product": { "code": "COMIC_BOOKS", "unitValue": 1500 }, "quantity": 1 },
            { "product": { "code": "MUSIC", "unitValue": 999 }, "quantity": 2 }
        ])),
    )
    .await;
    let order_id = created["orderId"].as_str().unwrap();

    let finished = wait_for_ending(&app, order_id).await;

    assert_eq!(finished["id"], created["id"]);
    assert_eq!(finished["source"], "ORCHESTRATOR");
    assert_eq!(finished["status"], "SUCCESS");
    assert_eq!(finished["payload"]["totalAmount"], 3498);
    assert_eq!(finished["payload"]["totalItems"], 3);

    let sources: Vec<&str> = finished["eventHistory"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["source"].as_str().unwrap())
        .collect();
    assert_eq!(
        sources,
        vec![
            "ORCHESTRATOR",
            "PRODUCT_VALIDATION_SERVICE",
            "PAYMENT_SERVICE",
            "INVENTORY_SERVICE",
            "ORCHESTRATOR",
        ]
    );
}

#[tokio::test]
async fn test_failed_order_saga() {
    let app = setup().await;

    let (_, created) = send(
        &app,
        post_order(json!([
            { "product": { "code": "BOOKS", "unitValue": 1000 }, "quantity": 11 }
        ])),
    )
    .await;
    let transaction_id = created["transactionId"].as_str().unwrap();
    let order_id = created["orderId"].as_str().unwrap();

    let finished = wait_for_ending(&app, order_id).await;
    assert_eq!(finished["status"], "FAIL");
    assert_eq!(
        finished["eventHistory"].as_array().unwrap().last().unwrap()["message"],
        "Saga finished with errors!"
    );

    let (status, by_tx) = send(
        &app,
        get(&format!("/api/event?transactionId={transaction_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_tx["id"], finished["id"]);
}

#[tokio::test]
async fn test_find_event_requires_a_filter() {
    let app = setup().await;

    let (status, json) = send(&app, get("/api/event")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "OrderID or TransactionID must be informed.");
}

#[tokio::test]
async fn test_find_event_not_found() {
    let app = setup().await;

    let (status, _) = send(
        &app,
        get("/api/event?orderId=00000000-0000-0000-0000-000000000000"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_find_event_with_invalid_order_id() {
    let app = setup().await;

    let (status, json) = send(&app, get("/api/event?orderId=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid orderId"));
}

#[tokio::test]
async fn test_find_all_events() {
    let app = setup().await;

    for code in ["BOOKS", "MOVIES"] {
        let (status, _) = send(
            &app,
            post_order(json!([
                { "product": { "code": code, "unitValue": 500 }, "quantity": 1 }
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = send(&app, get("/api/event/all")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
}
