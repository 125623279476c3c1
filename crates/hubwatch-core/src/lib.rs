//! # hubwatch-core: Pure Subscription Domain
//!
//! This crate holds the state model for hub subscriptions and the rules that
//! decide when a subscription must be renewed. It performs no I/O: the store,
//! the hub client, and the wall clock all live in outer crates and hand their
//! results in as plain values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        hubwatch Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  hubwatch-api (axum service)                    │   │
//! │  │   POST /subscribe  DELETE /unsubscribe  GET /subscriptions      │   │
//! │  │   POST /renew      GET /callback                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ hubwatch-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │   │
//! │  │   │   types    │  │  renewal   │  │ validation │  │  urls   │  │   │
//! │  │   │Subscription│  │  Policy    │  │ channel_id │  │ topic + │  │   │
//! │  │   │ Collection │  │  Report    │  │   shape    │  │callback │  │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK READS • PURE FUNCTIONS                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                hubwatch-store (persistence)                     │   │
//! │  │          one JSON document holding the whole collection         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Subscription record, collection, and listing views
//! - [`renewal`] - Renewal policy, per-record transitions, run report
//! - [`validation`] - Channel ID shape checks
//! - [`urls`] - Topic and callback URL derivation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use hubwatch_core::{RenewalPolicy, Subscription};
//!
//! let now = Utc::now();
//! let sub = Subscription::new(
//!     "UCXuqSBlHAE6Xw-yeJA0Tunw",
//!     "https://www.youtube.com/xml/feeds/videos.xml?channel_id=UCXuqSBlHAE6Xw-yeJA0Tunw",
//!     "https://hooks.example.com/callback",
//!     86_400,
//!     now,
//!     "202 Accepted",
//! );
//!
//! // A fresh 24h lease is outside the default 12h renewal window.
//! assert!(!RenewalPolicy::default().is_due(&sub, now));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod renewal;
pub mod types;
pub mod urls;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use renewal::{RenewalDecision, RenewalPolicy, RenewalReport, RenewalResult};
pub use types::*;
pub use urls::FeedUrls;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Schema tag written into `metadata.version` of the persisted document.
pub const SCHEMA_VERSION: &str = "1.0";

/// Lease requested from the hub when nothing else is configured (24 hours).
pub const DEFAULT_LEASE_SECONDS: i64 = 86_400;

/// Remaining lifetime below which a subscription becomes a renewal candidate.
pub const DEFAULT_RENEWAL_THRESHOLD_HOURS: i64 = 12;

/// Consecutive failed renewals tolerated before a record is reported as exhausted.
pub const DEFAULT_MAX_RENEWAL_ATTEMPTS: u32 = 3;

/// Largest lease accepted from configuration (ten years).
pub const MAX_LEASE_SECONDS: i64 = 10 * 365 * 86_400;

/// Largest renewal threshold accepted from configuration (ten years).
pub const MAX_RENEWAL_THRESHOLD_HOURS: i64 = 10 * 365 * 24;

/// Exact length of a channel ID: two-letter prefix plus 22 body characters.
pub const CHANNEL_ID_LEN: usize = 24;
