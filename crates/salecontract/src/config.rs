//! Configuration for sale contract binaries.
//!
//! All paths default to locations under the home directory
//! (`SALECONTRACT_HOME`, else `~/.salecontract`):
//!
//! ```text
//! <home>/
//! ├── config.toml   optional
//! ├── logs/
//! └── state/        file store
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::{FileStore, MemoryStore, StateStore};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// File store directory; defaults to <home>/state
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// State store backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One file per contract under the store directory
    #[default]
    File,
    /// Process-local; contents are lost on exit
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::File => "file",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset
    #[serde(default)]
    pub filter: Option<String>,
}

impl Config {
    /// Load `<home>/config.toml`, or defaults if it does not exist.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override the store directory (command line / environment).
    pub fn with_store_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.store.path = Some(dir);
        }
        self
    }

    pub fn store_dir(&self, home: &Path) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| home.join("state"))
    }

    /// Open the configured state store.
    pub fn open_store(&self, home: &Path) -> Result<Box<dyn StateStore>> {
        match self.store.backend {
            StoreBackend::File => {
                let dir = self.store_dir(home);
                let store = FileStore::open(&dir)
                    .with_context(|| format!("Failed to open state store: {}", dir.display()))?;
                Ok(Box::new(store))
            }
            StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}
