//! In-memory key store.

use async_trait::async_trait;
use sessionlock_crypto::PrivateKeyHandle;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::KeyStoreConfig;
use crate::error::{KeyStoreError, KeyStoreResult};
use crate::KeyStore;

/// Process-local key store. Entries vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    config: KeyStoreConfig,
    entries: Mutex<HashMap<String, PrivateKeyHandle>>,
}

impl MemoryKeyStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with a custom configuration.
    pub fn with_config(config: KeyStoreConfig) -> KeyStoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> KeyStoreResult<usize> {
        Ok(self.lock()?.len())
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> KeyStoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> KeyStoreResult<std::sync::MutexGuard<'_, HashMap<String, PrivateKeyHandle>>> {
        self.entries
            .lock()
            .map_err(|_| KeyStoreError::Storage("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    async fn get(&self, name: &str) -> KeyStoreResult<Option<PrivateKeyHandle>> {
        Ok(self.lock()?.get(name).cloned())
    }

    async fn set(&self, name: &str, key: &PrivateKeyHandle) -> KeyStoreResult<()> {
        self.lock()?.insert(name.to_string(), key.clone());
        Ok(())
    }

    async fn clear(&self) -> KeyStoreResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
