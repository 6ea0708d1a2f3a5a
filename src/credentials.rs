//! API key selection
//!
//! Image generation (and every other AI call) needs a key the family picked
//! themselves. The host side exposes two questions: "has a key been
//! selected?" and "ask the user to select one". Keys are stored in a
//! file-based store with the OS keyring as a fallback.

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

const KEYRING_SERVICE: &str = "lumiere";
const KEYRING_USER: &str = "gemini-api-key";

/// Environment variables checked before any stored key
pub const API_KEY_ENV_VARS: [&str; 2] = ["LUMIERE_API_KEY", "GEMINI_API_KEY"];

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Credential store lock poisoned")]
    Poisoned,
}

/// Host-side credential selection
pub trait CredentialProvider: Send + Sync {
    /// Whether a key is currently available
    fn has_selected(&self) -> bool;

    /// Ask the user to pick a key. Returns whether one is selected afterwards.
    fn select(&self) -> Result<bool, CredentialError>;

    /// The selected key, if any
    fn api_key(&self) -> Option<String>;
}

/// Source of a key when the user is asked to select one
pub trait KeyPrompt: Send + Sync {
    fn prompt_for_key(&self) -> Option<String>;
}

/// File + keyring backed key store
pub struct ApiKeyStore {
    data_dir: PathBuf,
    env_key: Option<String>,
    use_keyring: bool,
    prompt: Option<Box<dyn KeyPrompt>>,
    cached: Mutex<Option<String>>,
}

impl ApiKeyStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            env_key: None,
            use_keyring: true,
            prompt: None,
            cached: Mutex::new(None),
        }
    }

    /// Pick up a key from the environment, if one is set
    pub fn with_env(mut self) -> Self {
        self.env_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn KeyPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Only use the file store
    pub fn without_keyring(mut self) -> Self {
        self.use_keyring = false;
        self
    }

    fn key_file_path(&self) -> PathBuf {
        self.data_dir.join(".credentials").join(KEYRING_USER)
    }

    /// Look up a key: environment, then file, then keyring
    fn lookup(&self) -> Option<String> {
        if let Some(key) = &self.env_key {
            return Some(key.clone());
        }

        if let Ok(data) = std::fs::read_to_string(self.key_file_path()) {
            let key = data.trim().to_string();
            if !key.is_empty() {
                return Some(key);
            }
        }

        if self.use_keyring {
            if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
                if let Ok(key) = entry.get_password() {
                    return Some(key);
                }
            }
        }

        None
    }

    /// Store a key: write to file, also try keyring
    pub fn store_key(&self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        let file_path = self.key_file_path();
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, key)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(0o600));
        }

        if self.use_keyring {
            if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
                if let Err(e) = entry.set_password(key) {
                    log::debug!("Keyring unavailable, key kept in file store only: {}", e);
                }
            }
        }

        let mut cached = self.cached.lock().map_err(|_| CredentialError::Poisoned)?;
        *cached = Some(key.to_string());
        log::info!("API key selected");
        Ok(())
    }

    /// Forget the stored key (the environment key, if any, still applies)
    pub fn clear(&self) -> Result<(), CredentialError> {
        let _ = std::fs::remove_file(self.key_file_path());
        if self.use_keyring {
            if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
                let _ = entry.delete_credential();
            }
        }
        let mut cached = self.cached.lock().map_err(|_| CredentialError::Poisoned)?;
        *cached = None;
        Ok(())
    }
}

impl CredentialProvider for ApiKeyStore {
    fn has_selected(&self) -> bool {
        self.api_key().is_some()
    }

    fn select(&self) -> Result<bool, CredentialError> {
        let Some(prompt) = &self.prompt else {
            log::warn!("No key prompt configured, cannot select an API key");
            return Ok(self.has_selected());
        };

        match prompt.prompt_for_key() {
            Some(key) if !key.trim().is_empty() => {
                self.store_key(&key)?;
                Ok(true)
            }
            _ => Ok(self.has_selected()),
        }
    }

    fn api_key(&self) -> Option<String> {
        if let Ok(cached) = self.cached.lock() {
            if let Some(key) = cached.as_ref() {
                return Some(key.clone());
            }
        }
        let key = self.lookup();
        if let (Some(key), Ok(mut cached)) = (&key, self.cached.lock()) {
            *cached = Some(key.clone());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedPrompt(Option<&'static str>);

    impl KeyPrompt for FixedPrompt {
        fn prompt_for_key(&self) -> Option<String> {
            self.0.map(|s| s.to_string())
        }
    }

    #[test]
    fn test_nothing_selected_initially() {
        let temp = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp.path().to_path_buf()).without_keyring();
        assert!(!store.has_selected());
        assert!(store.api_key().is_none());
    }

    #[test]
    fn test_select_stores_prompted_key() {
        let temp = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp.path().to_path_buf())
            .without_keyring()
            .with_prompt(Box::new(FixedPrompt(Some("  abc123 \n"))));

        assert!(store.select().unwrap());
        assert_eq!(store.api_key().as_deref(), Some("abc123"));

        // A fresh store over the same directory sees the file
        let reopened = ApiKeyStore::new(temp.path().to_path_buf()).without_keyring();
        assert_eq!(reopened.api_key().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_select_without_answer_keeps_nothing() {
        let temp = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp.path().to_path_buf())
            .without_keyring()
            .with_prompt(Box::new(FixedPrompt(None)));
        assert!(!store.select().unwrap());
        assert!(!store.has_selected());
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let store = ApiKeyStore::new(temp.path().to_path_buf()).without_keyring();
        store.store_key("k").unwrap();
        assert!(store.has_selected());
        store.clear().unwrap();
        assert!(!store.has_selected());
    }
}
