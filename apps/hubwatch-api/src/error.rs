//! # API Error Type
//!
//! Unified error type for the HTTP use-cases.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant           HTTP   Touches store/hub?                            │
//! │  ───────────────   ────   ──────────────────────────────────────────    │
//! │  InvalidArgument   400    never (checked before any I/O)                │
//! │  Conflict          409    store read only                               │
//! │  NotFound          404    store read only                               │
//! │  UpstreamFailure   502    hub failed; no state mutation attempted       │
//! │  StorageFailure    500    load or save failed (message names which)     │
//! │  Internal          500    anything unexpected                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! { "status": "error", "code": "STORAGE_ERROR",
//!   "message": "Failed to save subscription state: disk full" }
//! ```
//! Conflicts use their own body: `{status:"conflict", channel_id, expires_at, message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use hubwatch_core::{CoreError, ValidationError};
use hubwatch_store::StoreError;

use crate::hub::HubError;

/// Which half of the read-modify-write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Load,
    Save,
}

impl std::fmt::Display for StorageOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageOp::Load => write!(f, "load"),
            StorageOp::Save => write!(f, "save"),
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 400
    InvalidArgument,
    /// 409
    Conflict,
    /// 404
    NotFound,
    /// 502
    UpstreamFailure,
    /// 500, storage location missing
    StorageNotConfigured,
    /// 500
    StorageError,
    /// 500
    Internal,
}

/// Use-case errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Already subscribed to channel {channel_id}")]
    Conflict {
        channel_id: String,
        expires_at: DateTime<Utc>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Hub request failed: {0}")]
    UpstreamFailure(#[from] HubError),

    #[error("Failed to {op} subscription state: {source}")]
    StorageFailure {
        op: StorageOp,
        #[source]
        source: StoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for use-cases.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn load_failed(source: StoreError) -> Self {
        ApiError::StorageFailure {
            op: StorageOp::Load,
            source,
        }
    }

    pub fn save_failed(source: StoreError) -> Self {
        ApiError::StorageFailure {
            op: StorageOp::Save,
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::StorageFailure { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            ApiError::Conflict { .. } => ErrorCode::Conflict,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::UpstreamFailure(_) => ErrorCode::UpstreamFailure,
            ApiError::StorageFailure { source, .. } if source.is_config_error() => {
                ErrorCode::StorageNotConfigured
            }
            ApiError::StorageFailure { .. } => ErrorCode::StorageError,
            ApiError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Required { field } => {
                ApiError::InvalidArgument(format!("{} parameter is required", field))
            }
            ValidationError::InvalidFormat { reason, .. } => {
                ApiError::InvalidArgument(format!("Invalid channel ID format. {}", capitalize(&reason)))
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlreadySubscribed {
                channel_id,
                expires_at,
            } => ApiError::Conflict {
                channel_id,
                expires_at,
            },
            CoreError::SubscriptionNotFound(_) => {
                ApiError::NotFound("Subscription not found for this channel".to_string())
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Conflict {
                channel_id,
                expires_at,
            } => json!({
                "status": "conflict",
                "channel_id": channel_id,
                "expires_at": expires_at,
                "message": "Already subscribed to this channel",
            }),
            other => json!({
                "status": "error",
                "code": other.code(),
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
