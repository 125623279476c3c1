//! Unsubscribe use-case.
//!
//! A failed hub call leaves the record in place: if the hub never confirmed
//! removal, the local state still shows the registration as live.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use hubwatch_core::validation::validate_channel_id;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Removes a channel from the hub and from the collection.
pub struct UnsubscribeService {
    state: Arc<AppState>,
}

impl UnsubscribeService {
    pub fn new(state: Arc<AppState>) -> Self {
        UnsubscribeService { state }
    }

    pub async fn unsubscribe(&self, channel_id: &str) -> ApiResult<()> {
        validate_channel_id(channel_id)?;

        let mut collection = self.state.store.load().await.map_err(ApiError::load_failed)?;
        collection.ensure_present(channel_id)?;

        let ack = self.state.hub_unsubscribe(channel_id).await.map_err(|e| {
            warn!(channel_id = %channel_id, error = %e, "Hub unsubscribe failed; record kept");
            ApiError::from(e)
        })?;

        debug!(channel_id = %channel_id, hub_status = ack.status, "Hub accepted unsubscribe");

        collection
            .remove(channel_id)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        self.state.store.save(&mut collection).await.map_err(|e| {
            error!(channel_id = %channel_id, error = %e, "Hub removal succeeded but state was not saved");
            ApiError::save_failed(e)
        })?;

        info!(channel_id = %channel_id, "Unsubscribed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{HubError, HubScript};
    use crate::services::subscribe_service::SubscribeService;
    use crate::services::test_support::{harness, CHANNEL};

    #[tokio::test]
    async fn test_unknown_channel_is_not_found_without_hub_call() {
        let h = harness();
        let service = UnsubscribeService::new(h.state.clone());

        let err = service.unsubscribe(CHANNEL).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "Subscription not found for this channel");
        assert_eq!(h.hub.call_count(), 0);
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_record() {
        let h = harness();
        SubscribeService::new(h.state.clone())
            .subscribe(CHANNEL)
            .await
            .unwrap();

        UnsubscribeService::new(h.state.clone())
            .unsubscribe(CHANNEL)
            .await
            .unwrap();

        let saved = h.store.snapshot().await.unwrap().unwrap();
        assert!(saved.is_empty());
        assert_eq!(
            h.hub.calls().last().map(|(mode, _)| mode.as_str()),
            Some("unsubscribe")
        );
    }

    #[tokio::test]
    async fn test_hub_failure_keeps_record() {
        let h = harness();
        SubscribeService::new(h.state.clone())
            .subscribe(CHANNEL)
            .await
            .unwrap();
        h.hub
            .push(HubScript::Fail(HubError::Transport("connection reset".into())));

        let err = UnsubscribeService::new(h.state.clone())
            .unsubscribe(CHANNEL)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::UpstreamFailure(_)));
        assert_eq!(h.store.save_count(), 1);
        let saved = h.store.snapshot().await.unwrap().unwrap();
        assert!(saved.contains(CHANNEL));
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected_first() {
        let h = harness();
        let err = UnsubscribeService::new(h.state.clone())
            .unsubscribe("not-a-channel")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert_eq!(h.store.load_count(), 0);
    }
}
