//! # JSON File Store
//!
//! Durable [`SubscriptionStore`] backed by one JSON file.
//!
//! ## Save Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. stamp metadata (last_updated = now, version ||= "1.0")              │
//! │  2. create parent directory if missing                                  │
//! │  3. write  subscriptions.json.tmp                                       │
//! │  4. fsync  subscriptions.json.tmp                                       │
//! │  5. rename subscriptions.json.tmp → subscriptions.json                  │
//! │                                                                         │
//! │  Readers see either the old document or the new one, never a torn      │
//! │  write.                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use hubwatch_core::SubscriptionCollection;

use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};
use crate::store::{decode_document, encode_document, SubscriptionStore};

/// File-backed subscription store.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Document path; `None` means storage was never configured.
    path: Option<PathBuf>,

    clock: Arc<dyn Clock>,

    /// Serializes saves from this process so they don't share a temp file.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store for `path`.
    ///
    /// A `None` path is accepted here and reported as
    /// [`StoreError::MissingLocation`] on first use.
    pub fn new(path: Option<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        JsonFileStore {
            path,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the configured document path.
    pub fn path(&self) -> StoreResult<&Path> {
        self.path.as_deref().ok_or(StoreError::MissingLocation)
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = Self::temp_path(path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl SubscriptionStore for JsonFileStore {
    async fn load(&self) -> StoreResult<SubscriptionCollection> {
        let path = self.path()?;

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let collection = decode_document(&bytes)?;
                debug!(path = %path.display(), count = collection.len(), "Loaded subscription document");
                Ok(collection)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No subscription document yet, starting empty");
                Ok(SubscriptionCollection::empty(self.clock.now()))
            }
            Err(e) => Err(StoreError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn save(&self, collection: &mut SubscriptionCollection) -> StoreResult<()> {
        let path = self.path()?;

        collection.stamp(self.clock.now());
        let bytes = encode_document(collection)?;

        let _guard = self.write_lock.lock().await;
        Self::write_atomically(path, &bytes)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(path = %path.display(), count = collection.len(), "Saved subscription document");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
