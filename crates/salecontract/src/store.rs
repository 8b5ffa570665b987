//! Key-value state store.
//!
//! The lifecycle manager only ever needs `get_state` / `put_state`. Two
//! backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local map, used by tests and one-shot runs
//! - [`FileStore`]: one file per key under a directory
//!
//! ```text
//! <home>/state/
//! ├── {hex(key_1)}.json
//! ├── {hex(key_2)}.json
//! ├── sha256-{sha256(long_key)}.json
//! └── ...
//! ```

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Store result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures of the underlying store, distinct from an absent key.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Get/put access to externally consistent state.
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when the key is absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put_state(key, value)
    }
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put_state(key, value)
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key, in order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

impl StateStore for MemoryStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Longest key stored under its hex encoding; 2 * 100 + ".json" stays well
/// under the common 255 byte file name limit.
const MAX_HEX_KEY_LEN: usize = 100;

/// Directory-backed store
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Keys are arbitrary strings; hex keeps file names portable and unambiguous.
    // Keys too long for a file name go by their SHA-256 instead. The `sha256-`
    // prefix is not valid hex, so the two schemes never collide.
    fn key_path(&self, key: &str) -> PathBuf {
        let name = if key.len() <= MAX_HEX_KEY_LEN {
            hex::encode(key.as_bytes())
        } else {
            format!("sha256-{}", hex::encode(Sha256::digest(key.as_bytes())))
        };
        self.dir.join(format!("{}.json", name))
    }
}

impl StateStore for FileStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let path = self.key_path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, path = %path.display(), "Loaded state");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        let path = self.key_path(key);
        atomic_write(&path, value)?;
        debug!(key, path = %path.display(), "Saved state");
        Ok(())
    }
}

/// Atomic write via temp file + rename
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(".tmp_{}", uuid::Uuid::new_v4()));
    fs::write(&temp_path, content).map_err(|e| StoreError::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }
    Ok(())
}
