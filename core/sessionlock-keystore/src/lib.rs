//! Device-local storage for the sessionlock private key.
//!
//! A key store is a durable, single-slot facility holding one
//! [`PrivateKeyHandle`]. The protocol only needs `get`, `set` and `clear`;
//! which slot to use is configuration ([`KeyStoreConfig`]) rather than a
//! hidden constant.
//!
//! Implementations:
//! - [`MemoryKeyStore`]: process-local, for tests and throwaway sessions
//! - [`SqliteKeyStore`]: a SQLite file that survives restarts; entries are
//!   sealed under a passphrase-derived key before they touch disk

mod config;
mod error;
mod memory;
mod sqlite;

pub use config::KeyStoreConfig;
pub use error::{KeyStoreError, KeyStoreResult};
pub use memory::MemoryKeyStore;
pub use sqlite::SqliteKeyStore;

use async_trait::async_trait;
use sessionlock_crypto::PrivateKeyHandle;

/// Async get/set/clear contract over named private key entries.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// The configuration this store was opened with.
    fn config(&self) -> &KeyStoreConfig;

    /// Reads the entry stored under `name`.
    async fn get(&self, name: &str) -> KeyStoreResult<Option<PrivateKeyHandle>>;

    /// Writes `key` under `name`, replacing any existing entry.
    async fn set(&self, name: &str, key: &PrivateKeyHandle) -> KeyStoreResult<()>;

    /// Removes every entry.
    async fn clear(&self) -> KeyStoreResult<()>;

    /// Reads the device key from the configured slot.
    async fn load_private_key(&self) -> KeyStoreResult<Option<PrivateKeyHandle>> {
        self.get(&self.config().key_slot).await
    }

    /// Writes the device key into the configured slot.
    async fn store_private_key(&self, key: &PrivateKeyHandle) -> KeyStoreResult<()> {
        self.set(&self.config().key_slot, key).await
    }
}

#[async_trait]
impl<S: KeyStore + ?Sized> KeyStore for std::sync::Arc<S> {
    fn config(&self) -> &KeyStoreConfig {
        (**self).config()
    }

    async fn get(&self, name: &str) -> KeyStoreResult<Option<PrivateKeyHandle>> {
        (**self).get(name).await
    }

    async fn set(&self, name: &str, key: &PrivateKeyHandle) -> KeyStoreResult<()> {
        (**self).set(name, key).await
    }

    async fn clear(&self) -> KeyStoreResult<()> {
        (**self).clear().await
    }
}
