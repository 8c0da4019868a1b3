//! Key-value storage provider for storefront plugins
//!
//! String keys map to string-serialized (JSON) values. Plugins only talk to
//! the [`KeyValueStorage`] trait; the backend decides where the bytes live.
//!
//! # Backends
//!
//! - [`FileStorage`]: one JSON file per group in the platform config directory
//! - [`MemoryStorage`]: in-process map with switchable failures
//!
//! # Example
//!
//! ```ignore
//! use storefront_store::{AppName, FileStorage, KeyValueStorage};
//!
//! let app_name = AppName::new("com", "lenscraft", "camera_shop");
//! let storage = FileStorage::new(&app_name, "storefront");
//!
//! storage.set("favorites", "[]".to_string()).await?;
//! let raw = storage.get("favorites").await?;
//! ```

mod app_name;
mod error;
mod helpers;
mod memory;
mod storage;

pub use app_name::AppName;
pub use error::{Result, StoreError};
pub use helpers::{read_value, write_value};
pub use memory::MemoryStorage;
pub use storage::{FileStorage, group_path, load_group, modify_group, save_group};

/// Asynchronous string key-value storage
///
/// Implementations must be cheap to share behind an `Arc`; the futures they
/// return are `Send` so they can run on a multi-threaded executor.
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    /// Delete `key`, returning whether it existed
    fn remove(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}
