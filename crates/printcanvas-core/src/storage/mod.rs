//! Durable key-value slots for persisted design state.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::{
    AutoSaveQueue,
    FlushOutcome,
    PendingWrite,
    PlatformStorage,
    create_default_storage,
};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Quota exceeded: {needed} bytes requested, {available} available")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A durable byte store addressed by key.
///
/// Implementations can keep values in memory, on the filesystem, or in
/// browser local storage.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// A durable byte store addressed by key (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}
