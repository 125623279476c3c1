//! Use-case implementations.
//!
//! Each service holds the shared [`AppState`](crate::AppState) and runs one
//! load → mutate → save cycle per call. HTTP handlers in
//! [`routes`](crate::routes) are thin wrappers around these.

pub mod listing_service;
pub mod renewal_service;
pub mod subscribe_service;
pub mod unsubscribe_service;

pub use listing_service::{ListingService, SubscriptionListing};
pub use renewal_service::RenewalService;
pub use subscribe_service::{SubscribeService, Subscribed};
pub use unsubscribe_service::UnsubscribeService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use hubwatch_store::{ManualClock, MemoryStore};

    use crate::config::ServiceConfig;
    use crate::hub::ScriptedHub;
    use crate::AppState;

    pub const CHANNEL: &str = "UC0000000000000000000001";

    pub fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    pub struct Harness {
        pub state: Arc<AppState>,
        pub store: Arc<MemoryStore>,
        pub hub: ScriptedHub,
        pub clock: Arc<ManualClock>,
    }

    pub fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(start()));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let hub = ScriptedHub::new();
        let state = Arc::new(AppState::new(
            &ServiceConfig::default(),
            store.clone(),
            Arc::new(hub.clone()),
            clock.clone(),
        ));

        Harness {
            state,
            store,
            hub,
            clock,
        }
    }
}
