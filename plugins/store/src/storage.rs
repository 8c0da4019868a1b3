//! File-backed storage: one JSON object per group

use crate::app_name::AppName;
use crate::error::{Result, StoreError};
use crate::KeyValueStorage;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Get the file path for a group inside `dir`
///
/// Each group is stored in a separate JSON file named `<group>.json`
pub fn group_path(dir: &Path, group: &str) -> PathBuf {
    dir.join(format!("{}.json", group))
}

/// Load a group from disk
///
/// Returns an empty map if the file doesn't exist or is empty.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_group(dir: &Path, group: &str) -> Result<HashMap<String, String>> {
    let path = group_path(dir, group);

    let contents = match fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => return Err(StoreError::Read { path, source }),
    };

    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        group: group.to_string(),
        source,
    })
}

/// Save a group to disk
///
/// Creates the storage directory if it doesn't exist.
/// The data is saved as pretty-printed JSON to a sibling `.tmp` file that is
/// then renamed over the group file, so readers see either the old or the
/// new group, never a partial one.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the data cannot be
/// serialized, or the file cannot be written.
pub async fn save_group(dir: &Path, group: &str, data: &HashMap<String, String>) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| StoreError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = group_path(dir, group);
    let tmp_path = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(data)?;

    fs::write(&tmp_path, contents)
        .await
        .map_err(|source| StoreError::Write {
            path: tmp_path.clone(),
            source,
        })?;

    fs::rename(&tmp_path, &path)
        .await
        .map_err(|source| StoreError::Write { path, source })
}

/// Modify a group by loading it, applying a modification function, and saving it back
///
/// The modifier returns `true` if it changed the data; the group is only
/// written back in that case. Returns whether a write happened.
///
/// # Errors
///
/// Returns an error if loading or saving fails.
pub async fn modify_group<F>(dir: &Path, group: &str, modifier: F) -> Result<bool>
where
    F: FnOnce(&mut HashMap<String, String>) -> bool,
{
    let mut data = load_group(dir, group).await?;
    let modified = modifier(&mut data);

    if modified {
        save_group(dir, group, &data).await?;
    }

    Ok(modified)
}

/// Key-value storage persisted as a JSON group file
///
/// Clones share the same file and the same write lock, so read-modify-write
/// cycles on the group never interleave within a process.
///
/// # Example
///
/// ```no_run
/// use storefront_store::{AppName, FileStorage, KeyValueStorage};
///
/// # async fn run() -> storefront_store::Result<()> {
/// let storage = FileStorage::new(&AppName::new("com", "lenscraft", "camera_shop"), "storefront");
/// storage.set("favorites", "[]".to_string()).await?;
/// assert_eq!(storage.get("favorites").await?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
    group: String,
    lock: Arc<Mutex<()>>,
}

impl FileStorage {
    /// Storage for `group` in the application's platform config directory
    pub fn new(app_name: &AppName, group: impl Into<String>) -> Self {
        Self::in_dir(app_name.storage_dir(), group)
    }

    /// Storage for `group` in an explicit directory
    pub fn in_dir(dir: impl Into<PathBuf>, group: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            group: group.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing JSON file
    pub fn path(&self) -> PathBuf {
        group_path(&self.dir, &self.group)
    }
}

impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let data = load_group(&self.dir, &self.group).await?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;

        // A group that no longer parses is rewritten from scratch
        let mut data = match load_group(&self.dir, &self.group).await {
            Ok(data) => data,
            Err(err @ StoreError::Parse { .. }) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path().display(),
                    "discarding corrupt store group"
                );
                HashMap::new()
            }
            Err(err) => return Err(err),
        };
        data.insert(key.to_string(), value);
        save_group(&self.dir, &self.group, &data).await?;

        tracing::debug!(group = %self.group, key, "wrote store entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        modify_group(&self.dir, &self.group, |data| data.remove(key).is_some()).await
    }
}
