//! # Feed URL Derivation
//!
//! Every subscription exchanges two URLs with the hub:
//!
//! - **topic**: the feed being watched, `<topic_base><channel_id>`
//! - **callback**: where the hub delivers notifications, `<public_url>/callback`
//!
//! Both are pure functions of the channel ID and the service's own
//! configuration, so the same channel always produces the same pair.

use serde::{Deserialize, Serialize};

/// Path appended to the public base URL to form the hub callback.
pub const CALLBACK_PATH: &str = "/callback";

/// Builds topic and callback URLs from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUrls {
    /// Prefix the channel ID is appended to.
    pub topic_base: String,

    /// Public URL of this service (scheme + host, optional path prefix).
    pub public_base: String,
}

impl FeedUrls {
    /// Creates a new URL builder.
    pub fn new(topic_base: impl Into<String>, public_base: impl Into<String>) -> Self {
        FeedUrls {
            topic_base: topic_base.into(),
            public_base: public_base.into(),
        }
    }

    /// Returns the topic URL for a channel.
    pub fn topic_url(&self, channel_id: &str) -> String {
        format!("{}{}", self.topic_base, channel_id)
    }

    /// Returns the callback URL registered with the hub.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.public_base.trim_end_matches('/'), CALLBACK_PATH)
    }
}
