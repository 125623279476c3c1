//! # Subscription Store Contract
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Full-Document Read-Modify-Write                         │
//! │                                                                         │
//! │  Invocation A                      Invocation B                         │
//! │  ────────────                      ────────────                         │
//! │  load()  → {X}                                                          │
//! │                                    load()  → {X}                        │
//! │  insert Y → {X, Y}                                                      │
//! │                                    insert Z → {X, Z}                    │
//! │  save({X, Y})                                                           │
//! │                                    save({X, Z})   ← Y is lost           │
//! │                                                                         │
//! │  There is no version token: the last writer wins the whole document.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations must:
//! - return an empty collection (version `1.0`, `last_updated = now`) when
//!   no document exists yet
//! - return [`StoreError::Decode`] for a malformed document
//! - stamp `metadata.last_updated` and default `metadata.version` on save
//! - replace the whole document atomically on save

use async_trait::async_trait;

use hubwatch_core::SubscriptionCollection;

use crate::error::{StoreError, StoreResult};

/// Loads and saves the subscription collection as a single document.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Reads the whole collection.
    async fn load(&self) -> StoreResult<SubscriptionCollection>;

    /// Stamps metadata on `collection` and overwrites the stored document.
    async fn save(&self, collection: &mut SubscriptionCollection) -> StoreResult<()>;
}

/// Serializes a collection into the persisted JSON layout.
pub fn encode_document(collection: &SubscriptionCollection) -> StoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(collection).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Parses the persisted JSON layout.
pub fn decode_document(bytes: &[u8]) -> StoreResult<SubscriptionCollection> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_document(b"{ not json"),
            Err(StoreError::Decode(_))
        ));
        assert!(matches!(
            decode_document(br#"{"subscriptions": []}"#),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_tolerates_missing_metadata() {
        let collection = decode_document(br#"{"subscriptions": {}}"#).unwrap();
        assert!(collection.is_empty());
        assert!(collection.metadata.version.is_empty());
    }
}
