//! # Domain Types
//!
//! The state model for hub subscriptions.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  SubscriptionCollection  (one persisted document)                      │
//! │  ├── subscriptions: channel_id → Subscription                          │
//! │  └── metadata: { last_updated, version }                               │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌──────────────────────┐                   │
//! │  │    Subscription      │   │  SubscriptionInfo    │  (listing view)   │
//! │  │  ──────────────────  │   │  ──────────────────  │                   │
//! │  │  channel_id (key)    │   │  channel_id          │                   │
//! │  │  topic/callback_url  │   │  status (computed)   │                   │
//! │  │  lease_seconds       │   │  expires_at          │                   │
//! │  │  expires_at          │   │  days_until_expiry   │                   │
//! │  │  renewal_attempts    │   └──────────────────────┘                   │
//! │  └──────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expiry Is a View
//! The stored `status` is always `active`. Whether a record is expired is
//! computed at read time from `expires_at`, see [`Subscription::status_at`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::SCHEMA_VERSION;

// =============================================================================
// Subscription Status
// =============================================================================

/// Status of a subscription as seen by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SubscriptionStatus {
    /// Lease has not yet run out.
    #[default]
    Active,

    /// `expires_at` is in the past.
    Expired,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Expired => write!(f, "expired"),
        }
    }
}

// =============================================================================
// Subscription Record
// =============================================================================

/// One channel's registration with the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// External channel identifier; primary key in the collection.
    pub channel_id: String,

    /// Feed URL registered as `hub.topic`.
    pub topic_url: String,

    /// Our endpoint registered as `hub.callback`.
    pub callback_url: String,

    /// Stored status. Always `active`; see [`Subscription::status_at`].
    #[serde(default)]
    pub status: SubscriptionStatus,

    /// Lease requested from the hub.
    pub lease_seconds: i64,

    pub subscribed_at: DateTime<Utc>,

    /// `last_renewal + lease_seconds`.
    pub expires_at: DateTime<Utc>,

    pub last_renewal: DateTime<Utc>,

    /// Consecutive failed renewals since the last success.
    #[serde(default)]
    pub renewal_attempts: u32,

    /// Last acknowledgment text from the hub (diagnostics only).
    #[serde(default)]
    pub hub_response: String,
}

impl Subscription {
    /// Creates a freshly subscribed record whose lease starts at `now`.
    pub fn new(
        channel_id: impl Into<String>,
        topic_url: impl Into<String>,
        callback_url: impl Into<String>,
        lease_seconds: i64,
        now: DateTime<Utc>,
        hub_response: impl Into<String>,
    ) -> Self {
        Subscription {
            channel_id: channel_id.into(),
            topic_url: topic_url.into(),
            callback_url: callback_url.into(),
            status: SubscriptionStatus::Active,
            lease_seconds,
            subscribed_at: now,
            expires_at: now + Duration::seconds(lease_seconds),
            last_renewal: now,
            renewal_attempts: 0,
            hub_response: hub_response.into(),
        }
    }

    /// Returns true if the lease has run out at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Status as seen at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if self.is_expired_at(now) {
            SubscriptionStatus::Expired
        } else {
            self.status
        }
    }

    /// Time left on the lease; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Builds the listing view of this record.
    pub fn info_at(&self, now: DateTime<Utc>) -> SubscriptionInfo {
        SubscriptionInfo {
            channel_id: self.channel_id.clone(),
            status: self.status_at(now),
            expires_at: self.expires_at,
            days_until_expiry: self.remaining(now).num_seconds() as f64 / 86_400.0,
        }
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Set to the save time on every save.
    #[serde(default)]
    pub last_updated: DateTime<Utc>,

    /// Schema tag; defaulted to [`SCHEMA_VERSION`] on save when empty.
    #[serde(default)]
    pub version: String,
}

/// The full set of subscriptions, persisted as one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscriptionCollection {
    #[serde(default)]
    pub subscriptions: HashMap<String, Subscription>,

    #[serde(default)]
    pub metadata: CollectionMetadata,
}

impl SubscriptionCollection {
    /// Creates the empty collection used when no document exists yet.
    pub fn empty(now: DateTime<Utc>) -> Self {
        SubscriptionCollection {
            subscriptions: HashMap::new(),
            metadata: CollectionMetadata {
                last_updated: now,
                version: SCHEMA_VERSION.to_string(),
            },
        }
    }

    /// Stamps metadata before a save.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.metadata.last_updated = now;
        if self.metadata.version.is_empty() {
            self.metadata.version = SCHEMA_VERSION.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn get(&self, channel_id: &str) -> Option<&Subscription> {
        self.subscriptions.get(channel_id)
    }

    pub fn get_mut(&mut self, channel_id: &str) -> Option<&mut Subscription> {
        self.subscriptions.get_mut(channel_id)
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.subscriptions.contains_key(channel_id)
    }

    /// Fails with [`CoreError::AlreadySubscribed`] if the channel has a record.
    pub fn ensure_absent(&self, channel_id: &str) -> CoreResult<()> {
        match self.subscriptions.get(channel_id) {
            Some(existing) => Err(CoreError::AlreadySubscribed {
                channel_id: channel_id.to_string(),
                expires_at: existing.expires_at,
            }),
            None => Ok(()),
        }
    }

    /// Fails with [`CoreError::SubscriptionNotFound`] if the channel has no record.
    pub fn ensure_present(&self, channel_id: &str) -> CoreResult<&Subscription> {
        self.subscriptions
            .get(channel_id)
            .ok_or_else(|| CoreError::SubscriptionNotFound(channel_id.to_string()))
    }

    /// Inserts a new record, keeping channel IDs unique.
    pub fn insert(&mut self, subscription: Subscription) -> CoreResult<()> {
        self.ensure_absent(&subscription.channel_id)?;
        self.subscriptions
            .insert(subscription.channel_id.clone(), subscription);
        Ok(())
    }

    /// Removes and returns the record for a channel.
    pub fn remove(&mut self, channel_id: &str) -> CoreResult<Subscription> {
        self.subscriptions
            .remove(channel_id)
            .ok_or_else(|| CoreError::SubscriptionNotFound(channel_id.to_string()))
    }

    /// Listing views ordered by channel ID.
    pub fn infos_at(&self, now: DateTime<Utc>) -> Vec<SubscriptionInfo> {
        let mut infos: Vec<SubscriptionInfo> =
            self.subscriptions.values().map(|s| s.info_at(now)).collect();
        infos.sort_by(|a, b| a.channel_id.cmp(&b.channel_id));
        infos
    }

    /// Active/expired counts at `now`.
    pub fn summary_at(&self, now: DateTime<Utc>) -> SubscriptionSummary {
        let expired = self
            .subscriptions
            .values()
            .filter(|s| s.is_expired_at(now))
            .count();

        SubscriptionSummary {
            total: self.subscriptions.len(),
            active: self.subscriptions.len() - expired,
            expired,
        }
    }
}

// =============================================================================
// Listing Views
// =============================================================================

/// One row of the subscription listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubscriptionInfo {
    pub channel_id: String,
    pub status: SubscriptionStatus,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
    /// Fractional days; negative once expired.
    pub days_until_expiry: f64,
}

/// Aggregate counts for the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubscriptionSummary {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================
