//! Client-Side Persistent Store
//!
//! Plain-string key-value storage standing in for the browser's
//! localStorage: auth token, theme preference, cached user email and the
//! local-only settings that are never sent to the backend. Values live
//! in a small TOML file under the user's local data directory and
//! survive across sessions until explicitly changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bearer token set on login, cleared on logout. Presence is the sole
/// signal of "logged in"; it is never validated client-side.
pub const TOKEN_KEY: &str = "auth_token";
/// Persisted light/dark preference.
pub const THEME_KEY: &str = "theme_preference";
/// Email cached from the last successful profile fetch.
pub const EMAIL_KEY: &str = "user_email";
/// Local-only notification setting (never sent to the backend).
pub const NOTIFICATIONS_KEY: &str = "cfg_notifications";
/// Local-only locale setting (never sent to the backend).
pub const LOCALE_KEY: &str = "cfg_locale";

/// File-backed string store. Every mutation is flushed immediately.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Store {
    /// Open the store at its default location
    /// (`<data_local_dir>/glicemia/store.toml`).
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glicemia");
        Self::open(dir.join("store.toml"))
    }

    /// Open (or create) a store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| StoreError::Io {
                path: path.clone(),
                error: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| StoreError::Parse {
                path: path.clone(),
                error: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Current auth token, if logged in.
    pub fn token(&self) -> Option<&str> {
        self.get(TOKEN_KEY)
    }

    /// Set or clear the auth token. `None` logs out.
    pub fn set_token(&mut self, token: Option<&str>) -> Result<(), StoreError> {
        match token {
            Some(t) => self.set(TOKEN_KEY, t),
            None => self.remove(TOKEN_KEY),
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        let content = toml::to_string(&self.values).map_err(|e| StoreError::Serialize {
            error: e.to_string(),
        })?;

        std::fs::write(&self.path, content).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse store file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to serialize store: {error}")]
    Serialize { error: String },
}
