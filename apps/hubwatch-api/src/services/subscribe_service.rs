//! Subscribe use-case.
//!
//! ```text
//! validate ──► load ──► present? ──yes──► Conflict (existing expires_at)
//!                          │ no
//!                          ▼
//!                    hub subscribe ──fail──► UpstreamFailure (nothing saved)
//!                          │ ok
//!                          ▼
//!                    insert + save ──fail──► StorageFailure (hub already registered)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use hubwatch_core::validation::validate_channel_id;
use hubwatch_core::Subscription;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Successful subscribe outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscribed {
    pub channel_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Registers a channel with the hub and records it.
pub struct SubscribeService {
    state: Arc<AppState>,
}

impl SubscribeService {
    pub fn new(state: Arc<AppState>) -> Self {
        SubscribeService { state }
    }

    pub async fn subscribe(&self, channel_id: &str) -> ApiResult<Subscribed> {
        validate_channel_id(channel_id)?;

        let mut collection = self.state.store.load().await.map_err(ApiError::load_failed)?;

        if let Err(conflict) = collection.ensure_absent(channel_id) {
            info!(channel_id = %channel_id, "Already subscribed");
            return Err(conflict.into());
        }

        let ack = self.state.hub_subscribe(channel_id).await.map_err(|e| {
            warn!(channel_id = %channel_id, error = %e, "Hub subscribe failed");
            ApiError::from(e)
        })?;

        debug!(channel_id = %channel_id, hub_status = ack.status, "Hub accepted subscribe");

        let now = self.state.clock.now();
        let subscription = Subscription::new(
            channel_id,
            self.state.urls.topic_url(channel_id),
            self.state.urls.callback_url(),
            self.state.policy.lease_seconds,
            now,
            ack.message,
        );
        let expires_at = subscription.expires_at;

        // Unreachable after ensure_absent on this same collection.
        collection
            .insert(subscription)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if let Err(e) = self.state.store.save(&mut collection).await {
            error!(
                channel_id = %channel_id,
                error = %e,
                "Hub registration succeeded but state was not saved"
            );
            return Err(ApiError::save_failed(e));
        }

        info!(channel_id = %channel_id, expires_at = %expires_at, "Subscribed");

        Ok(Subscribed {
            channel_id: channel_id.to_string(),
            expires_at,
        })
    }
}
