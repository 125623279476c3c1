//! # hubwatch API
//!
//! HTTP service that registers channels with a WebSub push hub and keeps the
//! leases alive.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          hubwatch API Services                          │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │SubscribeService│  │UnsubscribeSvc  │  │  ListingService            ││
//! │  │                │  │                │  │                            ││
//! │  │ • validate     │  │ • validate     │  │ • status at clock time     ││
//! │  │ • hub register │  │ • hub remove   │  │ • active/expired counts    ││
//! │  │ • persist      │  │ • persist      │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐                                                     │
//! │  │ RenewalService │  one load, hub calls, at most one save per run      │
//! │  └────────────────┘                                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure (AppState)                    │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────────┐  ┌──────────────────┐  ┌─────────────────┐ │  │
//! │  │  │SubscriptionStore │  │   HubGateway     │  │     Clock       │ │  │
//! │  │  │ JSON document    │  │ WebSub (reqwest) │  │ wall / manual   │ │  │
//! │  │  └──────────────────┘  └──────────────────┘  └─────────────────┘ │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Each use-case is a load → mutate → save cycle over the whole document with
//! no cross-request locking. Two overlapping writers resolve as
//! last-writer-wins. A request dropped mid-flight (client disconnect) stops
//! at its current `.await`; nothing is persisted unless the save completed.
//!
//! ## Configuration
//! See [`config`]; everything is read from `hubwatch.toml` and `HUBWATCH_*`
//! environment variables.

pub mod config;
pub mod error;
pub mod hub;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use hubwatch_core::{FeedUrls, RenewalPolicy};
use hubwatch_store::{Clock, SubscriptionStore};

// Re-exports
pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use hub::{HubAck, HubError, HubGateway, HubScript, ScriptedHub, WebSubHubClient};
pub use routes::router;

/// Shared application state.
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub hub: Arc<dyn HubGateway>,
    pub clock: Arc<dyn Clock>,
    pub urls: FeedUrls,
    pub policy: RenewalPolicy,
    /// Upper bound on one hub call, enforced around every gateway request.
    pub hub_timeout: Duration,
}

impl AppState {
    /// Wires the state from configuration and the three capabilities.
    pub fn new(
        config: &ServiceConfig,
        store: Arc<dyn SubscriptionStore>,
        hub: Arc<dyn HubGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AppState {
            store,
            hub,
            clock,
            urls: config.feed_urls(),
            policy: config.renewal_policy(),
            hub_timeout: config.hub_timeout(),
        }
    }

    /// Hub subscribe bounded by `hub_timeout`.
    pub async fn hub_subscribe(&self, channel_id: &str) -> Result<hub::HubAck, HubError> {
        self.bounded(self.hub.subscribe(channel_id)).await
    }

    /// Hub unsubscribe bounded by `hub_timeout`.
    pub async fn hub_unsubscribe(&self, channel_id: &str) -> Result<hub::HubAck, HubError> {
        self.bounded(self.hub.unsubscribe(channel_id)).await
    }

    async fn bounded<F>(&self, call: F) -> Result<hub::HubAck, HubError>
    where
        F: std::future::Future<Output = Result<hub::HubAck, HubError>>,
    {
        match tokio::time::timeout(self.hub_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(HubError::Timeout(self.hub_timeout.as_secs())),
        }
    }
}
