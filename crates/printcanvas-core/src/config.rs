//! Store configuration.

/// Storage slot holding the persisted design history.
pub const DEFAULT_STORAGE_KEY: &str = "drwpp-design-storage";

/// Past and future states kept when persisting.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Stored in place of embedded image payloads.
pub const IMAGE_PLACEHOLDER: &str = "[IMAGE_NON_STOCKEE]";

/// Configuration for a [`DesignStore`](crate::store::DesignStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key of the durable slot.
    pub storage_key: String,
    /// Number of past (and future) states written to storage.
    pub history_window: usize,
    /// Replacement for `data:` image references in storage.
    pub image_placeholder: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            image_placeholder: IMAGE_PLACEHOLDER.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_image_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.image_placeholder = placeholder.into();
        self
    }
}
