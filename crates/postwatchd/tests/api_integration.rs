//! Integration tests for the collector HTTP API

use std::sync::Arc;

use serde_json::{Value, json};

use postwatch_store::HistoryStore;
use postwatchd::config::Config;
use postwatchd::router::create_router;
use postwatchd::state::AppState;

/// Bind the router to an ephemeral port over an in-memory store
async fn spawn_collector() -> String {
    let store = HistoryStore::open_in_memory().expect("in-memory store");
    let state = Arc::new(AppState::new(store, Config::default()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{addr}")
}

fn payload(device_id: &str, os_update: &str, disk_encryption: &str) -> Value {
    json!({
        "device_id": device_id,
        "disk_encryption": disk_encryption,
        "os_update": os_update,
        "antivirus": "Antivirus running",
        "sleep_settings": "Sleep OK (5 min)"
    })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("parse JSON");
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn submit_then_fetch_latest() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/report"))
        .json(&payload("d1", "Up to date", "Disabled"))
        .send()
        .await
        .expect("send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("parse JSON");
    assert_eq!(body["status"], "ok");

    let latest: Value = client
        .get(format!("{base}/reports/d1"))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(latest["device_id"], "d1");
    assert_eq!(latest["disk_encryption"], "Disabled");
    assert_eq!(latest["os_update"], "Up to date");
    assert!(latest["id"].as_i64().is_some());
    assert!(latest["observed_at"].as_str().is_some());
}

#[tokio::test]
async fn missing_fields_are_all_named() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/report"))
        .json(&json!({"device_id": "x"}))
        .send()
        .await
        .expect("send request");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("parse JSON");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let missing: Vec<&str> = body["missing"]
        .as_array()
        .expect("missing list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        missing,
        ["disk_encryption", "os_update", "antivirus", "sleep_settings"]
    );
}

#[tokio::test]
async fn duplicate_submission_latest_is_most_recent_row() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let body = payload("d1", "Up to date", "Disabled");
    for _ in 0..2 {
        let response = client
            .post(format!("{base}/report"))
            .json(&body)
            .send()
            .await
            .expect("send request");
        assert!(response.status().is_success());
    }

    // Two identical-content rows exist; the latest query must return the
    // second insertion
    let latest: Value = client
        .get(format!("{base}/reports/d1"))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(latest["id"].as_i64(), Some(2));

    let all: Vec<Value> = client
        .get(format!("{base}/reports"))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn all_devices_one_row_each() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    for device in ["a", "b", "c"] {
        for _ in 0..3 {
            client
                .post(format!("{base}/report"))
                .json(&payload(device, "Up to date", "Enabled"))
                .send()
                .await
                .expect("send request");
        }
    }

    let all: Vec<Value> = client
        .get(format!("{base}/reports"))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn filter_returns_only_matching_latest() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/report"))
        .json(&payload("a", "Up to date", "Enabled"))
        .send()
        .await
        .expect("send request");
    client
        .post(format!("{base}/report"))
        .json(&payload("b", "Outdated", "Enabled"))
        .send()
        .await
        .expect("send request");

    let matched: Vec<Value> = client
        .get(format!("{base}/reports/filter"))
        .query(&[("os_update", "Outdated")])
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["device_id"], "b");
}

#[tokio::test]
async fn unknown_device_is_404() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/reports/ghost"))
        .send()
        .await
        .expect("send request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("parse JSON");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn empty_store_returns_empty_arrays_not_errors() {
    let base = spawn_collector().await;
    let client = reqwest::Client::new();

    let all: Vec<Value> = client
        .get(format!("{base}/reports"))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert!(all.is_empty());

    let filtered: Vec<Value> = client
        .get(format!("{base}/reports/filter"))
        .query(&[("os_update", "Outdated"), ("disk_encryption", "Disabled")])
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("parse JSON");
    assert!(filtered.is_empty());
}
