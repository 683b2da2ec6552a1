//! Encrypted local preference store
//!
//! The dashboard's analog of browser storage: small values (ids, tokens,
//! saved-card display data) JSON-serialized, encrypted with the application
//! key and persisted to a single file in the app data dir.
//!
//! Reads degrade to "absent": a missing key, a tampered value or a value
//! written under a different key all come back as `None` so callers handle
//! them identically.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encryption;
use crate::errors::AppError;
use crate::log_warn;

pub struct PrefStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl PrefStore {
    /// Open the store file, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<HashMap<String, String>>(&content).ok())
            .unwrap_or_default();

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Serialize, encrypt and persist a value under `key`.
    pub fn set_encrypted<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let plaintext = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("Failed to serialize value: {}", e)))?;
        let ciphertext = encryption::encrypt(&plaintext)?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Preference store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), ciphertext);
        self.flush(&entries)
    }

    /// Decrypt and deserialize the value under `key`.
    ///
    /// Absent, corrupted or undecryptable values all return `None`.
    pub fn get_decrypted<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let ciphertext = {
            let entries = self.entries.lock().ok()?;
            entries.get(key).cloned()?
        };

        let plaintext = match encryption::decrypt(&ciphertext) {
            Ok(p) => p,
            Err(_) => {
                log_warn!("PREFS", "Stored value failed to decrypt, treating as absent");
                return None;
            }
        };

        serde_json::from_str(&plaintext).ok()
    }

    /// Remove the value under `key`, if any. The in-memory entry is gone
    /// either way; a failed flush is logged, not swallowed.
    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
            if let Err(e) = self.flush(&entries) {
                log_warn!(
                    "PREFS",
                    &format!("Failed to persist removal of {}: {}", key, e)
                );
            }
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), AppError> {
        let content = serde_json::to_string(entries)
            .map_err(|e| AppError::Storage(format!("Failed to serialize store: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| AppError::Storage(format!("Failed to write store file: {}", e)))
    }
}
