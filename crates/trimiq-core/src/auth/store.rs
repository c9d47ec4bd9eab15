use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Storage key holding the session credential
pub const TOKEN_KEY: &str = "trimIQ_token";

/// Key-value file in the storage directory
const STORAGE_FILE: &str = "local_storage.json";

/// Persistence for the session credential.
///
/// Implementations must make `remove` idempotent.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, token: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// An empty stored value counts as no credential at all.
pub fn has_credential(token: Option<&str>) -> bool {
    token.is_some_and(|t| !t.is_empty())
}

/// Token store backed by a small JSON key-value file, surviving restarts.
pub struct FileTokenStore {
    storage_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    fn storage_path(&self) -> PathBuf {
        self.storage_dir.join(STORAGE_FILE)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let path = self.storage_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read local storage file")?;
        serde_json::from_str(&contents).context("Failed to parse local storage file")
    }

    /// Replace the file in one rename so a crash never leaves it half written.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)
            .context("Failed to create storage directory")?;
        let contents = serde_json::to_string_pretty(entries)?;

        let mut file = NamedTempFile::new_in(&self.storage_dir)
            .context("Failed to create temporary storage file")?;
        file.write_all(contents.as_bytes())
            .context("Failed to write local storage file")?;
        file.persist(self.storage_path())
            .context("Failed to replace local storage file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable local storage");
            BTreeMap::new()
        });
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        debug!(path = ?self.storage_path(), "Token saved");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match self.read_entries() {
            Ok(mut entries) => {
                if entries.remove(TOKEN_KEY).is_some() {
                    self.write_entries(&entries)?;
                    debug!("Token removed");
                }
            }
            Err(e) => {
                // Nothing in an unreadable file can be kept, the token included
                warn!(error = %e, "Removing unreadable local storage");
                std::fs::remove_file(self.storage_path())
                    .context("Failed to remove local storage file")?;
            }
        }
        Ok(())
    }
}

/// In-process token store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a usable token
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
