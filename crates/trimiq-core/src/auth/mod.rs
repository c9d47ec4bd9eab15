//! Authentication module for the session credential.
//!
//! This module provides:
//! - `TokenStore`: get/set/remove of the single session credential
//! - `FileTokenStore`: Key-value JSON file in the cache directory
//! - `KeyringTokenStore`: OS-level storage via keyring
//! - `MemoryTokenStore`: In-process store for tests and one-shot commands
//!
//! Presence of the credential is all the client checks. Validity is left
//! to the server.

pub mod keyring_store;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

pub use keyring_store::KeyringTokenStore;
pub use store::{has_credential, FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

use crate::config::TokenBackend;

/// Open the token store selected in config.
pub fn open_store(backend: TokenBackend, storage_dir: PathBuf) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match backend {
        TokenBackend::File => Arc::new(FileTokenStore::new(storage_dir)),
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(TokenBackend::File, dir.path().to_path_buf()).unwrap();
        store.set("tok").unwrap();

        let reopened = open_store(TokenBackend::File, dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get().unwrap().as_deref(), Some("tok"));
    }
}
