use anyhow::{Context, anyhow};
use async_trait::async_trait;
use directories::ProjectDirs;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::error::StoreError;

/// Keys the core reads and writes.
pub mod keys {
    /// JSON-encoded array of favorite city names.
    pub const FAVORITES: &str = "favorites";
    pub const DEFAULT_CITY: &str = "default_city";
    /// Boolean-as-string ("true"/"false") unit preference.
    pub const USE_FAHRENHEIT: &str = "use_fahrenheit";
}

/// Durable string-keyed storage. Whole-value reads and writes, no
/// transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// On-disk store: a single TOML table of string values under the platform
/// data directory. `set` is read-modify-write, and `fs::write` is not
/// atomic, so all file access is serialized by one lock: overlapping writers
/// cannot drop each other's keys and readers never see a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    io_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            io_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store file in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::new(dirs.data_dir().join("store.toml")))
    }

    fn read_all(&self) -> anyhow::Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;

        let values: HashMap<String, String> = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))?;

        Ok(values)
    }

    fn write_all(&self, values: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(values).context("Failed to serialize store values")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.io_lock.lock().await;

        let values = self.read_all().map_err(|source| StoreError::Read {
            key: key.to_string(),
            source,
        })?;

        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;

        let mut values = self.read_all().map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })?;

        values.insert(key.to_string(), value.to_string());

        self.write_all(&values).map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store for tests and ephemeral sessions. Writes can be made to
/// fail on demand so persistence-failure contracts are testable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Lock poisoning only happens if a panicking test held the guard;
        // recovering the inner map keeps the other tests meaningful.
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.locked().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: anyhow!("write failure injected for test"),
            });
        }

        self.locked().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
