//! Key-value store backed by a single JSON file

use super::KeyValueStore;
use crate::{BreatheError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORE_FILE_NAME: &str = "storage.json";

/// Stores every key in one JSON object on disk.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// original, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Open the store inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORE_FILE_NAME))
    }

    /// Open the store in the platform data directory
    pub fn default_location() -> Result<Self> {
        let dir = default_data_dir()?;
        Ok(Self::in_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Current values before a write. Unparseable content is replaced, but a
    /// store that cannot be read at all fails the write.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.load() {
            Err(BreatheError::SerializationError(e)) => {
                warn!("Replacing unreadable store {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(values)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        debug!("Saved {} keys to {}", values.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut values = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut values = self.load_for_write()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Platform data directory for this app (e.g. `~/.local/share/just-breathe`)
pub fn default_data_dir() -> Result<PathBuf> {
    let mut path = dirs::data_local_dir()
        .ok_or_else(|| BreatheError::StorageError("Failed to get local data dir".into()))?;
    path.push("just-breathe");
    Ok(path)
}
