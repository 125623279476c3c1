//! # hubwatch-store: Subscription State Persistence
//!
//! The subscription collection is persisted as ONE document. There is no
//! per-record persistence and no optimistic concurrency token: every use-case
//! loads the whole collection, mutates it in memory, and saves it back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        hubwatch Data Flow                               │
//! │                                                                         │
//! │  HTTP trigger (subscribe / unsubscribe / renew)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    hubwatch-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────┐  ┌───────────────┐  ┌───────────────┐    │   │
//! │  │   │SubscriptionStore│  │ JsonFileStore │  │  MemoryStore  │    │   │
//! │  │   │   (store.rs)    │  │  (file.rs)    │  │ (memory.rs)   │    │   │
//! │  │   │                 │◄─│ tmp + rename  │  │ counters and  │    │   │
//! │  │   │  load / save    │◄─│ fsync         │  │ fault hooks   │    │   │
//! │  │   └─────────────────┘  └───────────────┘  └───────────────┘    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { "subscriptions": { "<channel_id>": {...} },                          │
//! │    "metadata": { "last_updated": "...", "version": "1.0" } }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `SubscriptionStore` contract and document codec
//! - [`file`] - Durable JSON file implementation
//! - [`memory`] - In-memory implementation
//! - [`clock`] - Injectable time source
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hubwatch_store::{JsonFileStore, SubscriptionStore, SystemClock};
//!
//! let store = JsonFileStore::new(Some("/var/lib/hubwatch/subscriptions.json".into()),
//!                                Arc::new(SystemClock));
//! let mut collection = store.load().await?;
//! // ... mutate ...
//! store.save(&mut collection).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::SubscriptionStore;
