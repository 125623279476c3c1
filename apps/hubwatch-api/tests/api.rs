//! Router-level tests: drive the full axum app with in-memory capabilities.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use hubwatch_api::{router, AppState, HubError, HubScript, ScriptedHub, ServiceConfig};
use hubwatch_store::{JsonFileStore, ManualClock, MemoryStore, SubscriptionStore};

const CHANNEL: &str = "UC0000000000000000000001";

struct TestApp {
    app: Router,
    store: Arc<MemoryStore>,
    hub: ScriptedHub,
    clock: Arc<ManualClock>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let hub = ScriptedHub::new();
    let state = AppState::new(
        &ServiceConfig::default(),
        store.clone(),
        Arc::new(hub.clone()),
        clock.clone(),
    );

    TestApp {
        app: router(Arc::new(state)),
        store,
        hub,
        clock,
    }
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn subscribe_uri(channel_id: &str) -> String {
    format!("/subscribe?channel_id={}", channel_id)
}

fn unsubscribe_uri(channel_id: &str) -> String {
    format!("/unsubscribe?channel_id={}", channel_id)
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_and_malformed_channel_ids() {
    let t = test_app();

    let (status, body) = send_json(&t.app, Method::POST, "/subscribe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert_eq!(body["message"], "channel_id parameter is required");

    let (status, body) = send_json(&t.app, Method::POST, &subscribe_uri("UC123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid channel ID format"));

    let (status, _) = send_json(&t.app, Method::DELETE, &unsubscribe_uri("UC123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(t.store.load_count(), 0);
    assert_eq!(t.hub.call_count(), 0);
}

#[tokio::test]
async fn test_padded_channel_id_is_rejected() {
    let t = test_app();
    let padded = format!("%20{}%20", CHANNEL);

    let (status, body) = send_json(&t.app, Method::POST, &subscribe_uri(&padded)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let (status, body) = send_json(&t.app, Method::DELETE, &unsubscribe_uri(&padded)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    assert_eq!(t.store.load_count(), 0);
    assert_eq!(t.hub.call_count(), 0);
    assert!(t.store.snapshot().await.unwrap().is_none());
}

// =============================================================================
// Subscribe / Unsubscribe
// =============================================================================

#[tokio::test]
async fn test_double_subscribe_returns_conflict_with_same_expiry() {
    let t = test_app();

    let (status, first) = send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "success");
    assert_eq!(first["channel_id"], CHANNEL);
    let expires_at: DateTime<Utc> = serde_json::from_value(first["expires_at"].clone()).unwrap();
    assert!(expires_at > start());
    assert_eq!(t.store.save_count(), 1);

    let (status, second) = send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(second["status"], "conflict");
    assert_eq!(second["expires_at"], first["expires_at"]);
    assert_eq!(t.store.save_count(), 1);
}

#[tokio::test]
async fn test_unsubscribe_unknown_never_calls_hub() {
    let t = test_app();

    let (status, body) = send_json(&t.app, Method::DELETE, &unsubscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Subscription not found for this channel");
    assert_eq!(t.hub.call_count(), 0);
}

#[tokio::test]
async fn test_hub_failure_maps_to_bad_gateway() {
    let t = test_app();
    t.hub.push(HubScript::Fail(HubError::Rejected {
        status: 503,
        body: "try later".into(),
    }));

    let (status, body) = send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_FAILURE");
    assert_eq!(t.store.save_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_names_operation() {
    let t = test_app();
    t.store.fail_next_load("bucket offline").await;

    let (status, body) = send_json(&t.app, Method::GET, "/subscriptions").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to load subscription state"));
}

#[tokio::test]
async fn test_unconfigured_storage_is_distinct() {
    let clock = Arc::new(ManualClock::new(start()));
    let state = AppState::new(
        &ServiceConfig::default(),
        Arc::new(JsonFileStore::new(None, clock.clone())),
        Arc::new(ScriptedHub::new()),
        clock,
    );
    let app = router(Arc::new(state));

    let (status, body) = send_json(&app, Method::GET, "/subscriptions").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_NOT_CONFIGURED");
}

// =============================================================================
// Renewal
// =============================================================================

#[tokio::test]
async fn test_renew_twice_without_due_records_is_a_no_op() {
    let t = test_app();
    send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    let saves = t.store.save_count();

    for _ in 0..2 {
        let (status, body) = send_json(&t.app, Method::POST, "/renew").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["total_checked"], 1);
        assert_eq!(body["renewals_candidates"], 0);
        assert_eq!(body["results"].as_array().unwrap().len(), 0);
    }

    assert_eq!(t.store.save_count(), saves);
}

#[tokio::test]
async fn test_attempts_cap_stops_hub_calls() {
    let t = test_app();
    send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;

    let mut collection = t.store.load().await.unwrap();
    collection.get_mut(CHANNEL).unwrap().renewal_attempts = 2;
    t.store.save(&mut collection).await.unwrap();

    t.clock.advance(Duration::hours(14));
    t.hub.always(HubScript::Fail(HubError::Transport("reset".into())));

    let (_, body) = send_json(&t.app, Method::POST, "/renew").await;
    assert_eq!(body["renewals_failed"], 1);
    assert_eq!(body["results"][0]["attempt_count"], 3);
    let hub_calls = t.hub.call_count();

    let (_, body) = send_json(&t.app, Method::POST, "/renew").await;
    assert_eq!(body["renewals_candidates"], 1);
    assert_eq!(body["results"][0]["success"], false);
    assert_eq!(
        body["results"][0]["message"],
        "Max renewal attempts (3) exceeded"
    );
    assert_eq!(t.hub.call_count(), hub_calls);
}

#[tokio::test]
async fn test_renew_success_reports_new_expiry() {
    let t = test_app();
    send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    t.clock.advance(Duration::hours(18));

    let (status, body) = send_json(&t.app, Method::POST, "/renew").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewals_succeeded"], 1);

    let result = &body["results"][0];
    assert_eq!(result["success"], true);
    assert_eq!(result["attempt_count"], 0);
    let expiry: DateTime<Utc> = serde_json::from_value(result["new_expiry_time"].clone()).unwrap();
    assert_eq!(expiry, start() + Duration::hours(18 + 24));
}

// =============================================================================
// Round Trip & End-to-End
// =============================================================================

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let path = dir.path().join("subscriptions.json");

    let state = AppState::new(
        &ServiceConfig::default(),
        Arc::new(JsonFileStore::new(Some(path.clone()), clock.clone())),
        Arc::new(ScriptedHub::new()),
        clock.clone(),
    );
    let app = router(Arc::new(state));

    let (status, _) = send_json(&app, Method::POST, &subscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::OK);

    let reopened = JsonFileStore::new(Some(path), clock);
    let loaded = reopened.load().await.unwrap();
    let record = loaded.get(CHANNEL).unwrap();
    assert_eq!(record.expires_at, start() + Duration::hours(24));
    assert_eq!(loaded.metadata.version, "1.0");
}

#[tokio::test]
async fn test_end_to_end_lifecycle() {
    let t = test_app();

    let (status, body) = send_json(&t.app, Method::POST, &subscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::OK);
    let expires_at: DateTime<Utc> = serde_json::from_value(body["expires_at"].clone()).unwrap();
    assert_eq!(expires_at, start() + Duration::hours(24));

    let (_, listing) = send_json(&t.app, Method::GET, "/subscriptions").await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["active"], 1);
    assert_eq!(listing["expired"], 0);
    assert_eq!(listing["subscriptions"][0]["status"], "active");

    t.clock.set(expires_at + Duration::minutes(1));

    let (_, listing) = send_json(&t.app, Method::GET, "/subscriptions").await;
    assert_eq!(listing["active"], 0);
    assert_eq!(listing["expired"], 1);
    assert_eq!(listing["subscriptions"][0]["status"], "expired");
    assert!(listing["subscriptions"][0]["days_until_expiry"].as_f64().unwrap() < 0.0);

    let (status, body) = send(&t.app, Method::DELETE, &unsubscribe_uri(CHANNEL)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (_, listing) = send_json(&t.app, Method::GET, "/subscriptions").await;
    assert_eq!(listing["total"], 0);
}

// =============================================================================
// Verification & Health
// =============================================================================

#[tokio::test]
async fn test_callback_echoes_challenge() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/callback?hub.mode=subscribe&hub.topic=feed&hub.challenge=abc123&hub.lease_seconds=86400",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"abc123");

    let (status, _) = send(&t.app, Method::GET, "/callback?hub.mode=denied&hub.challenge=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&t.app, Method::GET, "/callback?hub.mode=unsubscribe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, body) = send(&t.app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
