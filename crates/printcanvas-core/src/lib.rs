//! PrintCanvas Core Library
//!
//! Platform-agnostic design state for the PrintCanvas editor: the design
//! document, its undo/redo history, versioned persistence and print formats.

pub mod config;
pub mod design;
pub mod formats;
pub mod history;
pub mod persist;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_util;

pub use config::StoreConfig;
pub use design::{DesignDocument, FilterKind, FilterSettings, ProductOptions, generate_id};
pub use formats::{DEFAULT_FORMAT_ID, FormatCategory, PrintFormat};
pub use history::History;
pub use persist::{CURRENT_VERSION, CodecError, PersistedSnapshot};
pub use storage::{FlushOutcome, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::DesignStore;
