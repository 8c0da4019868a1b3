//! In-process storage backend

use crate::KeyValueStorage;
use crate::error::{Result, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Key-value storage held in memory
///
/// Cloning yields another handle to the same entries. Reads and writes can be
/// switched to fail, which makes it useful for previews and tests of
/// failure handling.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.inner.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        storage
    }

    /// Make every subsequent read fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current raw value of `key`, bypassing failure switches
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("memory storage {} disabled", op)));
        }
        Ok(())
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check(&self.inner.fail_reads, "reads")?;
        Ok(self.entries()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check(&self.inner.fail_writes, "writes")?;
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.check(&self.inner.fail_writes, "writes")?;
        Ok(self.entries()?.remove(key).is_some())
    }
}
