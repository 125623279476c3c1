//! # Store Error Types
//!
//! Error types for subscription document persistence.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds path and operation context            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError::StorageFailure (in hubwatch-api) ← names load vs save       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP 500 with "Failed to load/save subscription state: <cause>"       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Subscription store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No storage location configured.
    ///
    /// ## When This Occurs
    /// - `storage.path` unset in config and `HUBWATCH_STORAGE__PATH` not exported
    ///
    /// This is the operator's problem to fix, not a transient failure.
    #[error("Storage location not configured: set storage.path (or HUBWATCH_STORAGE__PATH)")]
    MissingLocation,

    /// Reading the document failed.
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    /// Writing the document failed.
    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    /// The document exists but is not a valid collection.
    #[error("Malformed subscription document: {0}")]
    Decode(String),

    /// The collection could not be serialized.
    #[error("Failed to encode subscription document: {0}")]
    Encode(String),

    /// Injected failure (memory store) or other backend failure.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error is a configuration problem rather than I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(self, StoreError::MissingLocation)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
