//! # Error Types
//!
//! Domain-specific error types for hubwatch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hubwatch-core errors (this file)                                      │
//! │  ├── CoreError        - Collection rule violations                     │
//! │  └── ValidationError  - Channel ID input failures                      │
//! │                                                                         │
//! │  hubwatch-store errors (separate crate)                                │
//! │  └── StoreError       - Document load/save failures                    │
//! │                                                                         │
//! │  hubwatch-api errors (in app)                                          │
//! │  └── ApiError         - What HTTP clients see (status + JSON)          │
//! │                                                                         │
//! │  Flow: ValidationError / CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Collection-level rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The channel already has a subscription record.
    ///
    /// Carries the existing expiry so callers can report it without a
    /// second lookup.
    #[error("Channel {channel_id} is already subscribed (expires {expires_at})")]
    AlreadySubscribed {
        channel_id: String,
        expires_at: DateTime<Utc>,
    },

    /// No record exists for the channel.
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any storage or hub I/O happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field does not match the expected shape.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
