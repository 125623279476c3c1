//! # Renewal Rules
//!
//! Decides which subscriptions need re-registration and applies the outcome
//! of each attempt to the record.
//!
//! ## Per-Record State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  expires_at - now > threshold ──────────────► Skip (not a candidate)    │
//! │                                                                         │
//! │  attempts >= max_attempts ──────────────────► Exhausted                 │
//! │       record unchanged, hub NOT called,                                 │
//! │       retried again next run (no auto-unsubscribe)                      │
//! │                                                                         │
//! │  otherwise ─────────────────────────────────► Attempt (hub subscribe)   │
//! │       │                                                                 │
//! │       ├── success: attempts = 0                                         │
//! │       │            last_renewal = now                                   │
//! │       │            expires_at = now + lease (never moves backward)      │
//! │       │                                                                 │
//! │       └── failure: attempts += 1, expires_at unchanged                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The attempt counter is only ever changed here, in
//! [`Subscription::record_renewal_success`] and
//! [`Subscription::record_renewal_failure`]. The scheduler loop that calls
//! the hub must not touch it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Subscription;
use crate::{DEFAULT_LEASE_SECONDS, DEFAULT_MAX_RENEWAL_ATTEMPTS, DEFAULT_RENEWAL_THRESHOLD_HOURS};

// =============================================================================
// Policy
// =============================================================================

/// Renewal knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    /// Remaining lifetime at or below which a record is a candidate.
    pub threshold: Duration,

    /// Consecutive failures after which the hub is no longer called.
    pub max_attempts: u32,

    /// Lease applied on a successful renewal.
    pub lease_seconds: i64,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        RenewalPolicy {
            threshold: Duration::hours(DEFAULT_RENEWAL_THRESHOLD_HOURS),
            max_attempts: DEFAULT_MAX_RENEWAL_ATTEMPTS,
            lease_seconds: DEFAULT_LEASE_SECONDS,
        }
    }
}

/// What the scheduler should do with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalDecision {
    /// Outside the threshold window; leave it alone.
    Skip,

    /// Inside the window but out of attempts.
    Exhausted,

    /// Inside the window; call the hub.
    Attempt,
}

impl RenewalPolicy {
    /// Creates a policy from configuration values.
    pub fn new(threshold_hours: i64, max_attempts: u32, lease_seconds: i64) -> Self {
        RenewalPolicy {
            threshold: Duration::hours(threshold_hours),
            max_attempts,
            lease_seconds,
        }
    }

    /// Returns true if the record is inside the renewal window at `now`.
    pub fn is_due(&self, subscription: &Subscription, now: DateTime<Utc>) -> bool {
        subscription.remaining(now) <= self.threshold
    }

    /// Returns true if the record has used up its renewal attempts.
    pub fn is_exhausted(&self, subscription: &Subscription) -> bool {
        subscription.renewal_attempts >= self.max_attempts
    }

    /// Classifies one record for this run.
    pub fn decide(&self, subscription: &Subscription, now: DateTime<Utc>) -> RenewalDecision {
        if !self.is_due(subscription, now) {
            RenewalDecision::Skip
        } else if self.is_exhausted(subscription) {
            RenewalDecision::Exhausted
        } else {
            RenewalDecision::Attempt
        }
    }

    /// Message reported for an exhausted record.
    pub fn exhausted_message(&self) -> String {
        format!("Max renewal attempts ({}) exceeded", self.max_attempts)
    }
}

// =============================================================================
// Record Transitions
// =============================================================================

impl Subscription {
    /// Applies a successful hub re-registration.
    ///
    /// Returns the new expiry.
    pub fn record_renewal_success(
        &mut self,
        now: DateTime<Utc>,
        lease_seconds: i64,
        hub_response: impl Into<String>,
    ) -> DateTime<Utc> {
        let renewed_until = now + Duration::seconds(lease_seconds);

        self.renewal_attempts = 0;
        self.last_renewal = now;
        self.lease_seconds = lease_seconds;
        self.expires_at = self.expires_at.max(renewed_until);
        self.hub_response = hub_response.into();

        self.expires_at
    }

    /// Applies a failed hub re-registration.
    ///
    /// Returns the updated attempt count.
    pub fn record_renewal_failure(&mut self) -> u32 {
        self.renewal_attempts = self.renewal_attempts.saturating_add(1);
        self.renewal_attempts
    }
}

// =============================================================================
// Run Report
// =============================================================================

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RenewalResult {
    pub channel_id: String,
    pub success: bool,
    pub message: String,
    /// Failed attempts recorded on the subscription after this run.
    pub attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub new_expiry_time: Option<DateTime<Utc>>,
}

impl RenewalResult {
    pub fn renewed(channel_id: impl Into<String>, new_expiry: DateTime<Utc>) -> Self {
        RenewalResult {
            channel_id: channel_id.into(),
            success: true,
            message: "Subscription renewed successfully".to_string(),
            attempt_count: 0,
            new_expiry_time: Some(new_expiry),
        }
    }

    pub fn failed(channel_id: impl Into<String>, message: impl Into<String>, attempts: u32) -> Self {
        RenewalResult {
            channel_id: channel_id.into(),
            success: false,
            message: message.into(),
            attempt_count: attempts,
            new_expiry_time: None,
        }
    }
}

/// Summary of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RenewalReport {
    pub total_checked: usize,
    pub candidates: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<RenewalResult>,
}

impl RenewalReport {
    /// Starts a report for a collection of `total_checked` records.
    pub fn new(total_checked: usize) -> Self {
        RenewalReport {
            total_checked,
            ..Default::default()
        }
    }

    /// Records one candidate's outcome.
    pub fn push(&mut self, result: RenewalResult) {
        self.candidates += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// Orders results by channel ID.
    pub fn sort(&mut self) {
        self.results.sort_by(|a, b| a.channel_id.cmp(&b.channel_id));
    }

    /// Returns true if at least one record was processed.
    pub fn has_candidates(&self) -> bool {
        self.candidates > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
