//! Shared configuration storage.
//!
//! Readers take a snapshot with [`ConfigStore::get`]. Every build plan calls
//! [`ConfigStore::refresh`], so edits to the file apply to the next build.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::types::Config;

/// Thread-safe config container with interior mutability.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
    path: PathBuf,
}

impl ConfigStore {
    /// Create a new ConfigStore from initial config and path.
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Get a clone of the current config.
    pub fn get(&self) -> Config {
        self.inner.read().clone()
    }

    /// Reload config from the file.
    ///
    /// On success, atomically replaces the current config.
    /// On failure, keeps the old config and returns the error.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = Config::load_from(&self.path)?;
        *self.inner.write() = config;
        Ok(())
    }

    /// Reload if the config file exists.
    ///
    /// Returns whether a reload happened. A missing file leaves the current
    /// config untouched rather than resetting it to defaults.
    pub fn refresh(&self) -> Result<bool, ConfigError> {
        if !self.path.exists() {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
