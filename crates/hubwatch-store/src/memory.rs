//! In-memory [`SubscriptionStore`].
//!
//! Keeps the serialized document in memory, so loads and saves go through the
//! same JSON encoding as the file store. Counts calls and can be told to fail
//! the next load or save; use-case tests lean on both.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hubwatch_core::SubscriptionCollection;

use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};
use crate::store::{decode_document, encode_document, SubscriptionStore};

#[derive(Debug, Default)]
struct Faults {
    next_load: Option<String>,
    next_save: Option<String>,
}

/// Process-local subscription store.
#[derive(Debug)]
pub struct MemoryStore {
    document: Mutex<Option<Vec<u8>>>,
    faults: Mutex<Faults>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Creates a store with no document.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            document: Mutex::new(None),
            faults: Mutex::new(Faults::default()),
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            clock,
        }
    }

    /// Creates a store whose document is the given raw bytes.
    pub fn with_document(clock: Arc<dyn Clock>, raw: impl Into<Vec<u8>>) -> Self {
        MemoryStore {
            document: Mutex::new(Some(raw.into())),
            ..Self::new(clock)
        }
    }

    /// Number of completed `load` calls (including failed ones).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `save` calls (including failed ones).
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes the next `load` fail with [`StoreError::Unavailable`].
    pub async fn fail_next_load(&self, message: impl Into<String>) {
        self.faults.lock().await.next_load = Some(message.into());
    }

    /// Makes the next `save` fail with [`StoreError::Unavailable`].
    pub async fn fail_next_save(&self, message: impl Into<String>) {
        self.faults.lock().await.next_save = Some(message.into());
    }

    /// Decodes the stored document without counting as a load.
    pub async fn snapshot(&self) -> StoreResult<Option<SubscriptionCollection>> {
        match self.document.lock().await.as_deref() {
            Some(bytes) => decode_document(bytes).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn load(&self) -> StoreResult<SubscriptionCollection> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.faults.lock().await.next_load.take() {
            return Err(StoreError::Unavailable(message));
        }

        match self.document.lock().await.as_deref() {
            Some(bytes) => decode_document(bytes),
            None => Ok(SubscriptionCollection::empty(self.clock.now())),
        }
    }

    async fn save(&self, collection: &mut SubscriptionCollection) -> StoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.faults.lock().await.next_save.take() {
            return Err(StoreError::Unavailable(message));
        }

        collection.stamp(self.clock.now());
        let bytes = encode_document(collection)?;
        *self.document.lock().await = Some(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Utc;
    use hubwatch_core::Subscription;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc::now()))
    }

    #[tokio::test]
    async fn test_counts_calls() {
        let store = MemoryStore::new(clock());
        let mut collection = store.load().await.unwrap();
        store.save(&mut collection).await.unwrap();
        store.load().await.unwrap();

        assert_eq!(store.load_count(), 2);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let store = MemoryStore::new(clock());

        store.fail_next_load("bucket offline").await;
        assert!(matches!(store.load().await, Err(StoreError::Unavailable(_))));
        assert!(store.load().await.is_ok());

        let mut collection = SubscriptionCollection::default();
        store.fail_next_save("quota").await;
        assert!(store.save(&mut collection).await.is_err());
        assert!(store.snapshot().await.unwrap().is_none());
        assert!(store.save(&mut collection).await.is_ok());
    }

    #[tokio::test]
    async fn test_round_trip_through_json() {
        let store = MemoryStore::new(clock());
        let now = Utc::now();

        let mut collection = store.load().await.unwrap();
        collection
            .insert(Subscription::new(
                "UC0000000000000000000001",
                "topic",
                "callback",
                86_400,
                now,
                "",
            ))
            .unwrap();
        store.save(&mut collection).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.subscriptions, collection.subscriptions);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let store = MemoryStore::with_document(clock(), "[1, 2, 3]");
        assert!(matches!(store.load().await, Err(StoreError::Decode(_))));
    }
}
