//! Write-behind persistence of the design history.
//!
//! Edits enqueue a full snapshot; the host drives [`AutoSaveQueue::flush`]
//! whenever it gets a chance. Only the newest operation is kept, so a burst
//! of edits costs one write and the last writer always wins.

use crate::config::StoreConfig;
use crate::history::History;
use crate::persist;
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;

/// Operation waiting to reach storage.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Store this history, already windowed and without image payloads.
    Snapshot(History),
    /// Delete the slot.
    Remove,
}

/// What a call to [`AutoSaveQueue::flush`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued.
    Idle,
    /// The full snapshot was written.
    Saved,
    /// The full snapshot failed; only the present state was written.
    SavedMinimal,
    /// The slot was removed.
    Removed,
    /// Every attempt failed; the operation was dropped.
    Failed,
}

/// Single-slot write queue for one storage key.
pub struct AutoSaveQueue<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    config: StoreConfig,
    pending: Option<PendingWrite>,
}

impl<S: Storage> AutoSaveQueue<S> {
    /// Create a new queue writing to `config.storage_key`.
    pub fn new(storage: Arc<S>, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            pending: None,
        }
    }

    /// Queue a snapshot of `history`, replacing anything not yet flushed.
    ///
    /// The queued copy is windowed and has embedded images replaced, so it
    /// never holds image payloads.
    pub fn enqueue_snapshot(&mut self, history: &History) {
        if self.pending.is_some() {
            log::debug!("Superseding unflushed write for {}", self.config.storage_key);
        }
        let mut snapshot = history.windowed(self.config.history_window);
        persist::redact_embedded_images(&mut snapshot, &self.config.image_placeholder);
        self.pending = Some(PendingWrite::Snapshot(snapshot));
    }

    /// Queue removal of the slot, replacing anything not yet flushed.
    pub fn enqueue_remove(&mut self) {
        self.pending = Some(PendingWrite::Remove);
    }

    /// Check if an operation is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingWrite> {
        self.pending.as_ref()
    }

    /// Perform the queued operation, if any.
    ///
    /// Failures are logged and never returned: in-memory state stays
    /// authoritative until the next successful write.
    pub async fn flush(&mut self) -> FlushOutcome {
        let Some(op) = self.pending.take() else {
            return FlushOutcome::Idle;
        };

        match op {
            PendingWrite::Remove => match self.storage.remove(&self.config.storage_key).await {
                Ok(()) => {
                    log::debug!("Cleared {}", self.config.storage_key);
                    FlushOutcome::Removed
                }
                Err(e) => {
                    log::error!("Failed to clear {}: {}", self.config.storage_key, e);
                    FlushOutcome::Failed
                }
            },
            PendingWrite::Snapshot(history) => self.write_snapshot(&history).await,
        }
    }

    async fn write_snapshot(&self, history: &History) -> FlushOutcome {
        match self.write_encoded(persist::encode(history, &self.config)).await {
            Ok(()) => {
                log::debug!("Saved design history to {}", self.config.storage_key);
                return FlushOutcome::Saved;
            }
            Err(e) => log::warn!("Failed to save design history, retrying without it: {}", e),
        }

        match self.write_encoded(persist::encode_minimal(history, &self.config)).await {
            Ok(()) => {
                log::info!("Saved current design without image or history");
                FlushOutcome::SavedMinimal
            }
            Err(e) => {
                log::error!("Failed to save minimal design: {}", e);
                FlushOutcome::Failed
            }
        }
    }

    async fn write_encoded(
        &self,
        encoded: Result<Vec<u8>, persist::CodecError>,
    ) -> StorageResult<()> {
        let bytes = encoded.map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.write(&self.config.storage_key, &bytes).await
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::LocalStorage>> {
    Ok(Arc::new(crate::storage::LocalStorage::new()))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::LocalStorage;
