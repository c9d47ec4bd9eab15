use anyhow::{Context, Result};
use keyring::Entry;

use super::store::{TokenStore, TOKEN_KEY};

const SERVICE_NAME: &str = "trimiq";

/// Token store in the OS keychain, one entry under `trimIQ_token`.
///
/// The entry is created once and reused, so every call addresses the same
/// credential whatever store backs it.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY).context("Failed to create keyring entry")?;
        Ok(Self { entry })
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entry
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_same_store() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());

        let store = KeyringTokenStore::new().unwrap();
        assert_eq!(store.get().unwrap(), None);

        store.set("tok-1").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-1"));

        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
        // Nothing stored: still fine
        store.remove().unwrap();
    }

    /// Needs a running platform keychain (Secret Service, Keychain, Credential Manager).
    #[test]
    #[ignore]
    fn test_token_survives_new_store() {
        let first = KeyringTokenStore::new().unwrap();
        first.set("persisted-token").unwrap();

        let reopened = KeyringTokenStore::new().unwrap();
        assert_eq!(reopened.get().unwrap().as_deref(), Some("persisted-token"));

        reopened.remove().unwrap();
        assert_eq!(first.get().unwrap(), None);
    }
}
