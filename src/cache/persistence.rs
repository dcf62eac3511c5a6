//! Persistence Module
//!
//! Session-scoped mirror of cache entries. A `Storage` is the raw key/value
//! medium; `PersistenceAdapter` namespaces it per cache instance and makes
//! every operation best-effort.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Storage Trait ==
/// Key/value medium shared by every cache instance in the process.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;

    /// False when no medium backs this storage.
    fn is_available(&self) -> bool {
        true
    }
}

// == Noop Storage ==
/// Used when no persistence medium exists. Every operation succeeds and
/// stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        false
    }
}

// == Memory Storage ==
/// Process-wide in-memory medium. Clones share the same map, so a cache
/// rebuilt over a clone sees what the previous one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items().keys().cloned().collect())
    }
}

// == File Storage ==
/// Medium backed by one JSON object file, so entries outlive a process
/// restart for as long as the file (the session) is kept.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Opens (or lazily creates) the session file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. An unparsable file counts as empty, so the
    /// next write replaces it.
    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => match serde_json::from_str(&text) {
                Ok(items) => Ok(items),
                Err(err) => {
                    warn!(path = %self.path.display(), "Ignoring corrupt session file: {}", err);
                    Ok(BTreeMap::new())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load()?;
        apply(&mut items);
        self.save(&items)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.into_keys().collect())
    }
}

// == Storage Selection ==
/// Picks the medium for a process: the session file at `path` when one is
/// configured and can be opened, process memory otherwise.
pub fn open_storage(path: Option<&Path>) -> Arc<dyn Storage> {
    match path {
        Some(path) => match FileStorage::open(path) {
            Ok(storage) => Arc::new(storage),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    "Session storage unavailable, keeping entries in memory only: {}",
                    err
                );
                Arc::new(MemoryStorage::new())
            }
        },
        None => Arc::new(MemoryStorage::new()),
    }
}

// == Persistence Adapter ==
/// Namespaced, failure-swallowing view of a `Storage` for one cache instance.
#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn Storage>,
    namespace: String,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn Storage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn prefix(&self) -> String {
        format!("{}_", self.namespace)
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    // == Load ==
    /// Returns every persisted entry of this namespace still live at `now_ms`.
    /// Expired and unreadable records are deleted from the medium.
    pub fn load(&self, now_ms: u64) -> Vec<(String, CacheEntry)> {
        if !self.storage.is_available() {
            return Vec::new();
        }

        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(namespace = %self.namespace, "Failed to list persisted cache keys: {}", err);
                return Vec::new();
            }
        };

        let prefix = self.prefix();
        let mut restored = Vec::new();

        for storage_key in keys {
            let Some(key) = storage_key.strip_prefix(&prefix) else {
                continue;
            };

            match self.read_entry(&storage_key) {
                Ok(Some(entry)) if !entry.is_expired(now_ms) => {
                    restored.push((key.to_string(), entry));
                }
                Ok(Some(_)) => {
                    debug!(namespace = %self.namespace, key, "Dropping expired persisted entry");
                    self.remove_raw(&storage_key);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(
                    namespace = %self.namespace,
                    key,
                    "Discarding unreadable persisted entry: {}",
                    err
                );
                    self.remove_raw(&storage_key);
                }
            }
        }

        restored
    }

    fn read_entry(&self, storage_key: &str) -> Result<Option<CacheEntry>> {
        match self.storage.read(storage_key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    // == Save ==
    /// Writes `entry` under the namespaced key.
    pub fn save(&self, key: &str, entry: &CacheEntry) {
        if !self.storage.is_available() {
            return;
        }

        let result = serde_json::to_string(entry)
            .map_err(CacheError::from)
            .and_then(|text| self.storage.write(&self.storage_key(key), &text));

        if let Err(err) = result {
            warn!(namespace = %self.namespace, key, "Failed to persist cache entry: {}", err);
        }
    }

    // == Remove ==
    pub fn remove(&self, key: &str) {
        if self.storage.is_available() {
            self.remove_raw(&self.storage_key(key));
        }
    }

    fn remove_raw(&self, storage_key: &str) {
        if let Err(err) = self.storage.remove(storage_key) {
            warn!(
                namespace = %self.namespace,
                storage_key,
                "Failed to remove persisted entry: {}",
                err
            );
        }
    }

    // == Clear ==
    /// Removes every record under this namespace, leaving other namespaces alone.
    pub fn clear(&self) {
        if !self.storage.is_available() {
            return;
        }

        match self.storage.keys() {
            Ok(keys) => {
                let prefix = self.prefix();
                for storage_key in keys.iter().filter(|k| k.starts_with(&prefix)) {
                    self.remove_raw(storage_key);
                }
            }
            Err(err) => {
                warn!(namespace = %self.namespace, "Failed to list persisted cache keys: {}", err);
            }
        }
    }
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("namespace", &self.namespace)
            .field("available", &self.storage.is_available())
            .finish()
    }
}
