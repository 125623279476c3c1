//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method  Path             Success                    Service            │
//! │  ──────  ───────────────  ─────────────────────────  ────────────────   │
//! │  POST    /subscribe       200 {status:"success",..}  SubscribeService   │
//! │  DELETE  /unsubscribe     204                        UnsubscribeService │
//! │  GET     /subscriptions   200 {subscriptions,..}     ListingService     │
//! │  POST    /renew           200 {status:"success",..}  RenewalService     │
//! │  GET     /callback        200 <hub.challenge>        (hub verification) │
//! │  GET     /health          200 OK                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `channel_id` travels as a query parameter on `/subscribe` and
//! `/unsubscribe`. A missing parameter is treated like an empty one; the
//! value is validated exactly as received (no trimming).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use hubwatch_core::urls::CALLBACK_PATH;

use crate::error::ApiResult;
use crate::services::{ListingService, RenewalService, SubscribeService, UnsubscribeService};
use crate::AppState;

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/subscribe", post(subscribe_handler))
        .route("/unsubscribe", delete(unsubscribe_handler))
        .route("/subscriptions", get(subscriptions_handler))
        .route("/renew", post(renew_handler))
        .route(CALLBACK_PATH, get(callback_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// =============================================================================
// Subscription Handlers
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ChannelQuery {
    #[serde(default)]
    pub channel_id: String,
}

async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<impl IntoResponse> {
    let subscribed = SubscribeService::new(state)
        .subscribe(&query.channel_id)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "channel_id": subscribed.channel_id,
        "expires_at": subscribed.expires_at,
        "message": "Successfully subscribed to channel",
    })))
}

async fn unsubscribe_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<StatusCode> {
    UnsubscribeService::new(state)
        .unsubscribe(&query.channel_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn subscriptions_handler(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let listing = ListingService::new(state).list().await?;
    Ok(Json(listing))
}

async fn renew_handler(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let report = RenewalService::new(state).run().await?;

    Ok(Json(json!({
        "status": "success",
        "total_checked": report.total_checked,
        "renewals_candidates": report.candidates,
        "renewals_succeeded": report.succeeded,
        "renewals_failed": report.failed,
        "results": report.results,
    })))
}

// =============================================================================
// Hub Verification
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.topic")]
    pub topic: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.lease_seconds")]
    pub lease_seconds: Option<String>,
}

/// Echoes the hub's challenge for subscribe/unsubscribe verification.
async fn callback_handler(Query(query): Query<VerificationQuery>) -> impl IntoResponse {
    let mode = query.mode.as_deref().unwrap_or_default();
    let topic = query.topic.as_deref().unwrap_or_default();

    match (mode, query.challenge) {
        ("subscribe" | "unsubscribe", Some(challenge)) if !challenge.is_empty() => {
            info!(
                mode = %mode,
                topic = %topic,
                lease_seconds = query.lease_seconds.as_deref().unwrap_or("-"),
                "Hub verification"
            );
            (StatusCode::OK, challenge)
        }
        _ => {
            warn!(mode = %mode, topic = %topic, "Rejected verification request");
            (StatusCode::BAD_REQUEST, "Invalid verification request".to_string())
        }
    }
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}
