//! Subscription listing.

use std::sync::Arc;

use serde::Serialize;

use hubwatch_core::{SubscriptionInfo, SubscriptionSummary};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Listing rows plus aggregate counts, all evaluated at one clock reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionListing {
    pub subscriptions: Vec<SubscriptionInfo>,
    #[serde(flatten)]
    pub summary: SubscriptionSummary,
}

pub struct ListingService {
    state: Arc<AppState>,
}

impl ListingService {
    pub fn new(state: Arc<AppState>) -> Self {
        ListingService { state }
    }

    pub async fn list(&self) -> ApiResult<SubscriptionListing> {
        let collection = self.state.store.load().await.map_err(ApiError::load_failed)?;
        let now = self.state.clock.now();

        Ok(SubscriptionListing {
            subscriptions: collection.infos_at(now),
            summary: collection.summary_at(now),
        })
    }
}
