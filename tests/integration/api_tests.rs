//! API integration tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tower::ServiceExt;

use rolloff_server::{
    api,
    config::{AppConfig, StorageBackend},
    error::PersistenceError,
    repository::{KeyValueStore, MemoryStore},
    services::Services,
    AppState,
};

const KEY: &str = "dumpster_inventory";

async fn app() -> Router {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    let services = Services::with_store(Arc::new(MemoryStore::new()), KEY).await;

    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, value) = send_with_headers(app, method, uri, body).await;
    (status, value)
}

async fn send_with_headers(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

/// Store that reads as empty and refuses every write
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("quota exceeded".into()))
    }
}

async fn app_with_failing_writes() -> Router {
    let services = Services::with_store(Arc::new(ReadOnlyStore), KEY).await;
    api::router(AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_list_items_with_filters() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 20);

    let (_, body) = send(&app, Method::GET, "/api/v1/items?size=30&status=available", None).await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = send(&app, Method::GET, "/api/v1/items?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rent_return_flow() {
    let app = app().await;

    let (_, body) = send(&app, Method::GET, "/api/v1/availability/20", None).await;
    assert_eq!(body, json!({"available": true, "count": 5}));

    let (status, item) = send(
        &app,
        Method::POST,
        "/api/v1/rentals",
        Some(json!({
            "size": "20",
            "customerId": "cust-1",
            "startDate": "2024-05-01",
            "endDate": "2024-05-08"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["status"], "rented");
    assert_eq!(item["customerId"], "cust-1");
    assert_eq!(item["rentalStartDate"], "2024-05-01");

    let (_, body) = send(&app, Method::GET, "/api/v1/status", None).await;
    assert_eq!(body["activeRentals"], 1);
    assert_eq!(body["totalDumpsters"], 20);

    let id = item["id"].as_str().unwrap();
    let uri = format!("/api/v1/items/{}/return", id);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");
    assert_eq!(body["item"]["status"], "available");
    assert!(body["item"].get("customerId").is_none());

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NotRented");

    let (status, _) = send(&app, Method::POST, "/api/v1/items/missing/return", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rent_rejects_bad_requests() {
    let app = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/rentals",
        Some(json!({
            "size": "20",
            "customerId": "cust-1",
            "startDate": "2024-05-08",
            "endDate": "2024-05-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/rentals",
        Some(json!({"size": "20"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/rentals",
        Some(json!({
            "size": "40",
            "customerId": "cust-1",
            "startDate": "2024-05-01",
            "endDate": "2024-05-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_crud() {
    let app = app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({"name": "40 Yard Dumpster #1", "size": "40"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["location"], "Warehouse");
    let uri = format!("/api/v1/items/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"status": "maintenance", "location": "Shop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");
    assert_eq!(updated["location"], "Shop");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"status": "reserved"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidTransition");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/v1/items", Some(json!({"name": "", "size": "10"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_action_endpoint_reads() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/inventory?action=items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 20);
    assert!(body.get("persisted").is_none());

    let (_, lower) = send(&app, Method::GET, "/api/inventory?action=search&q=warehouse", None).await;
    let (_, upper) = send(&app, Method::GET, "/api/inventory?action=search&q=WAREHOUSE", None).await;
    assert_eq!(lower, upper);

    let (status, body) = send(&app, Method::GET, "/api/inventory?action=search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::GET, "/api/inventory", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_action_endpoint_writes() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "add", "item": {"name": "Roll-off #9", "size": "15"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["persisted"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "update", "id": id, "updates": {"location": "Job site 4"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], "Job site 4");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "update", "updates": {"location": "x"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "update", "id": "nope", "updates": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "delete", "id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "delete", "id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/inventory", Some(json!({"action": "explode"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_debug_dump() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/inventory/debug", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 20);
    assert_eq!(body["sample"], body["items"][0]);
}

#[tokio::test]
async fn test_persisted_header_on_successful_write() {
    let app = app().await;
    let (status, headers, _) = send_with_headers(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({"name": "Roll-off #3", "size": "20"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[api::PERSISTED_HEADER], "true");
}

#[tokio::test]
async fn test_failed_writes_still_succeed() {
    let app = app_with_failing_writes().await;

    let (status, headers, item) = send_with_headers(
        &app,
        Method::POST,
        "/api/v1/rentals",
        Some(json!({
            "size": "20",
            "customerId": "cust-9",
            "startDate": "2024-07-01",
            "endDate": "2024-07-03"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[api::PERSISTED_HEADER], "false");
    assert_eq!(item["status"], "rented");

    // The change is kept in memory
    let uri = format!("/api/v1/items/{}", item["id"].as_str().unwrap());
    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["customerId"], "cust-9");

    let (status, headers, body) = send_with_headers(
        &app,
        Method::POST,
        &format!("{}/return", uri),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[api::PERSISTED_HEADER], "false");
    assert_eq!(body["item"]["status"], "available");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some(json!({"action": "add", "item": {"name": "Roll-off #10", "size": "10"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["persisted"], false);
    assert_eq!(body["data"]["size"], "10");
}
