//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// An optional byte quota makes writes fail the way browser storage does
/// when it is full.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that holds at most `bytes` bytes across all keys.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(bytes),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(entries.get(&key).cloned())
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let bytes = bytes.to_vec();
        Box::pin(async move {
            let mut entries = self.entries.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            if let Some(quota) = self.quota {
                let used: usize = entries
                    .iter()
                    .filter(|(k, _)| **k != key)
                    .map(|(_, v)| v.len())
                    .sum();
                let available = quota.saturating_sub(used);
                if bytes.len() > available {
                    return Err(StorageError::QuotaExceeded {
                        needed: bytes.len(),
                        available,
                    });
                }
            }
            entries.insert(key, bytes);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self.entries.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            entries.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;

    #[test]
    fn test_write_and_read() {
        let storage = MemoryStorage::new();

        block_on(storage.write("slot", b"hello")).unwrap();
        let loaded = block_on(storage.read("slot")).unwrap();

        assert_eq!(loaded.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_read_missing() {
        let storage = MemoryStorage::new();
        assert!(block_on(storage.read("nonexistent")).unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let storage = MemoryStorage::new();

        block_on(storage.write("slot", b"x")).unwrap();
        block_on(storage.remove("slot")).unwrap();
        assert!(block_on(storage.read("slot")).unwrap().is_none());
        assert!(storage.is_empty());

        // removing again is fine
        block_on(storage.remove("slot")).unwrap();
    }

    #[test]
    fn test_quota() {
        let storage = MemoryStorage::with_quota(8);

        block_on(storage.write("a", b"12345")).unwrap();
        let result = block_on(storage.write("b", b"12345"));
        assert!(matches!(
            result,
            Err(StorageError::QuotaExceeded { needed: 5, available: 3 })
        ));

        // overwriting a key does not count its old value
        block_on(storage.write("a", b"12345678")).unwrap();
        assert_eq!(storage.len(), 1);
    }
}
