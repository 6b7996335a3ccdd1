//! Key store configuration.

use serde::{Deserialize, Serialize};
use sessionlock_crypto::KdfParams;

use crate::error::{KeyStoreError, KeyStoreResult};

/// Names the store and the single slot the device key lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStoreConfig {
    /// Name of the store (the SQLite table for [`SqliteKeyStore`]).
    ///
    /// [`SqliteKeyStore`]: crate::SqliteKeyStore
    pub store_name: String,
    /// Entry name of the device private key.
    pub key_slot: String,
    /// Cost of deriving the wrapping key from a passphrase.
    #[serde(default)]
    pub kdf: KdfParams,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            store_name: "session_lock_keystore".to_string(),
            key_slot: "privateKey".to_string(),
            kdf: KdfParams::default(),
        }
    }
}

impl KeyStoreConfig {
    /// Checks that the names are usable.
    ///
    /// The store name must be a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`)
    /// since it is spliced into SQL; the slot name must be non-empty.
    pub fn validate(&self) -> KeyStoreResult<()> {
        let mut chars = self.store_name.chars();
        let valid_ident = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid_ident {
            return Err(KeyStoreError::InvalidConfig(format!(
                "store name {:?} is not an identifier",
                self.store_name
            )));
        }
        if self.key_slot.is_empty() {
            return Err(KeyStoreError::InvalidConfig("key slot must not be empty".into()));
        }
        Ok(())
    }
}
