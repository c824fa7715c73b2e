//! Key-value storage backends for persisted records.

use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed store of JSON records.
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` means the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ─── Memory ─────────────────────────────────────────────────────────────────

/// In-process store. Clones share the same map, so a test can keep a handle
/// and inspect what the app wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn with_record(self, key: &str, value: &str) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.records.lock().ok().and_then(|r| r.get(key).cloned())
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ─── Filesystem ─────────────────────────────────────────────────────────────

/// One `<key>.json` file per record under `dir`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `saves/` next to the executable, falling back to the working directory.
    pub fn beside_executable() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(exe_dir.join("saves"))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        // Temp file then rename, so a crash never leaves half a record.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

// ─── Browser ────────────────────────────────────────────────────────────────

/// `window.localStorage`. The handle is fetched per call since it is not
/// `Send`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|_| StoreError::Unavailable("localStorage access denied".into()))?
            .ok_or_else(|| StoreError::Unavailable("localStorage missing".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StoreError::Unavailable(format!("reading '{}' failed", key)))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::Unavailable(format!("writing '{}' failed", key)))
    }
}
