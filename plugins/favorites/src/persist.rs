//! Reading and writing the favorites slot

use crate::error::{FavoritesError, Result};
use crate::item::FavoriteItem;
use serde_json::Value;
use storefront_store::{KeyValueStorage, read_value, write_value};

/// Storage key used when none is configured
pub const DEFAULT_KEY: &str = "favorites";

/// Where the favorites live inside the storage backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoritesConfig {
    /// Key holding the JSON array of favorites
    pub key: String,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl FavoritesConfig {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Read the stored collection
///
/// `Ok(None)` means nothing has been stored under `key` yet. Records are
/// decoded one at a time; a record that no longer decodes is logged and
/// skipped instead of failing the whole collection.
pub async fn load<S: KeyValueStorage>(storage: &S, key: &str) -> Result<Option<Vec<FavoriteItem>>> {
    let Some(records) = read_value::<Vec<Value>, _>(storage, key)
        .await
        .map_err(FavoritesError::load)?
    else {
        return Ok(None);
    };

    let items = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(key, index, error = %err, "skipping unreadable favorite");
                None
            }
        })
        .collect();

    Ok(Some(items))
}

/// Overwrite the stored collection with `items`
pub async fn persist<S: KeyValueStorage>(storage: &S, key: &str, items: &[FavoriteItem]) -> Result<()> {
    write_value(storage, key, items)
        .await
        .map_err(FavoritesError::persist)
}
