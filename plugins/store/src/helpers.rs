//! Typed access to any storage backend
//!
//! Values are stored as JSON strings; these helpers do the serde round trip
//! so callers work with their own types.

use crate::KeyValueStorage;
use crate::error::{Result, StoreError};
use serde::{Serialize, de::DeserializeOwned};

/// Read and deserialize the value stored under `key`
///
/// Returns `Ok(None)` when the key is absent or holds only whitespace.
///
/// # Errors
///
/// Returns an error if the backend fails or the stored JSON does not match `T`.
///
/// # Example
///
/// ```ignore
/// use storefront_store::{MemoryStorage, read_value, write_value};
///
/// let storage = MemoryStorage::new();
/// write_value(&storage, "recent", &vec!["a1".to_string()]).await?;
/// let recent: Option<Vec<String>> = read_value(&storage, "recent").await?;
/// assert_eq!(recent, Some(vec!["a1".to_string()]));
/// ```
pub async fn read_value<T, S>(storage: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStorage,
{
    let Some(raw) = storage.get(key).await? else {
        return Ok(None);
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Serialize `value` and store it under `key`
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or the backend fails.
pub async fn write_value<T, S>(storage: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStorage,
{
    let json = serde_json::to_string(value)?;
    storage.set(key, json).await
}
