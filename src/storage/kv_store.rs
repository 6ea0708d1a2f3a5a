//! Persisted key-value store
//!
//! String keys, JSON values, one file per key:
//! ```text
//! {data-dir}/kv/
//! ├── lumiere.content.animals.json
//! ├── lumiere.progress.history.json
//! └── lumiere.progress.stars.json
//! ```

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Prefix applied to every key
pub const KEY_NAMESPACE: &str = "lumiere.";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub struct KvStore {
    kv_dir: PathBuf,
}

impl KvStore {
    /// Open (and create if needed) the store under a data directory
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let kv_dir = data_dir.join("kv");
        fs::create_dir_all(&kv_dir)?;
        Ok(Self { kv_dir })
    }

    /// Map a logical key to its file. Keys may contain letters, digits, `.`,
    /// `-` and `_`; anything else is rejected so keys never escape the
    /// store directory.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.kv_dir.join(format!("{}{}.json", KEY_NAMESPACE, key)))
    }

    /// Raw string value for a key
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Overwrite the raw string value for a key
    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    /// Decode a JSON value. Missing keys are `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and overwrite a JSON value
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.set_raw(key, &json)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// All keys currently stored, without the namespace prefix, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.kv_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(key) = name
                .strip_prefix(KEY_NAMESPACE)
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
