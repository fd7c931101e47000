//! Browser localStorage implementation for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use wasm_bindgen::{JsCast, JsValue};

/// Storage backed by `window.localStorage`.
///
/// Values are stored as UTF-8 strings. Browsers cap localStorage at a few
/// megabytes, so writes of large snapshots can fail with a quota error.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backend() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;

        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let key = key.to_string();
        Box::pin(async move {
            let value = Self::backend()?
                .get_item(&key)
                .map_err(|e| StorageError::Other(format!("Failed to read {}: {:?}", key, e)))?;
            Ok(value.map(String::into_bytes))
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = String::from_utf8(bytes.to_vec());
        Box::pin(async move {
            let value = value.map_err(|e| StorageError::Serialization(e.to_string()))?;
            Self::backend()?
                .set_item(&key, &value)
                .map_err(|e| write_error(&key, value.len(), e))
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            Self::backend()?
                .remove_item(&key)
                .map_err(|e| StorageError::Other(format!("Failed to remove {}: {:?}", key, e)))
        })
    }
}

/// Map a failed `setItem` call, recognising a full origin.
fn write_error(key: &str, needed: usize, error: JsValue) -> StorageError {
    match error.dyn_ref::<web_sys::DomException>() {
        Some(exception) if exception.name() == "QuotaExceededError" => {
            StorageError::QuotaExceeded {
                needed,
                available: 0,
            }
        }
        _ => StorageError::Other(format!("Failed to write {}: {:?}", key, error)),
    }
}
