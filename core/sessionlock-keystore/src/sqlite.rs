//! Durable key store backed by a SQLite file.
//!
//! One table, named after [`KeyStoreConfig::store_name`], with one row per
//! entry. In practice the device key slot is the only row. Rows hold
//! [`SealedPrivateKey`] JSON, never the key itself. For passphrase-opened
//! stores the Argon2id salt lives in a companion `<store_name>_kdf` table.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use sessionlock_crypto::{PrivateKeyHandle, Salt, SealedPrivateKey, WrappingKey};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::KeyStoreConfig;
use crate::error::{KeyStoreError, KeyStoreResult};
use crate::KeyStore;

/// Key store persisted in SQLite.
pub struct SqliteKeyStore {
    config: KeyStoreConfig,
    conn: Arc<Mutex<Connection>>,
    wrapping_key: WrappingKey,
}

impl SqliteKeyStore {
    /// Opens (or creates) a key store at `path` with the default
    /// configuration, sealing entries under a key derived from `passphrase`.
    pub fn open(path: impl AsRef<Path>, passphrase: &str) -> KeyStoreResult<Self> {
        Self::open_with_config(path, passphrase, KeyStoreConfig::default())
    }

    /// Opens (or creates) a key store at `path`.
    ///
    /// The salt is generated on first open and reused afterwards, so the
    /// same passphrase reopens the same entries. A wrong passphrase is only
    /// detected when an entry is read.
    ///
    /// On Unix the file is restricted to the owner (mode 0600).
    pub fn open_with_config(
        path: impl AsRef<Path>,
        passphrase: &str,
        config: KeyStoreConfig,
    ) -> KeyStoreResult<Self> {
        if passphrase.is_empty() {
            return Err(KeyStoreError::InvalidConfig(
                "passphrase must not be empty".into(),
            ));
        }
        config.validate()?;
        let conn = open_file(path.as_ref())?;
        init_schema(&conn, &config)?;
        let salt = load_or_create_salt(&conn, &config)?;
        let wrapping_key = WrappingKey::derive(passphrase, &salt, &config.kdf)?;

        info!(path = %path.as_ref().display(), store = %config.store_name, "Opened key store");
        Ok(Self::from_parts(config, conn, wrapping_key))
    }

    /// Opens (or creates) a key store at `path` whose wrapping key is held
    /// by the caller, for example in a platform keychain.
    pub fn open_with_key(
        path: impl AsRef<Path>,
        wrapping_key: WrappingKey,
        config: KeyStoreConfig,
    ) -> KeyStoreResult<Self> {
        config.validate()?;
        let conn = open_file(path.as_ref())?;
        init_schema(&conn, &config)?;

        info!(path = %path.as_ref().display(), store = %config.store_name, "Opened key store");
        Ok(Self::from_parts(config, conn, wrapping_key))
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> KeyStoreResult<Self> {
        Self::open_in_memory_with_config(KeyStoreConfig::default())
    }

    /// Opens an in-memory store with a custom configuration, sealed under a
    /// random wrapping key.
    pub fn open_in_memory_with_config(config: KeyStoreConfig) -> KeyStoreResult<Self> {
        config.validate()?;
        let conn = Connection::open_in_memory().map_err(|e| {
            KeyStoreError::Storage(format!("failed to open in-memory key store: {e}"))
        })?;
        init_schema(&conn, &config)?;
        Ok(Self::from_parts(config, conn, WrappingKey::generate()?))
    }

    fn from_parts(config: KeyStoreConfig, conn: Connection, wrapping_key: WrappingKey) -> Self {
        Self {
            config,
            conn: Arc::new(Mutex::new(conn)),
            wrapping_key,
        }
    }

    fn lock(&self) -> KeyStoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| KeyStoreError::Storage("key store connection lock poisoned".into()))
    }
}

fn open_file(path: &Path) -> KeyStoreResult<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| KeyStoreError::Storage(format!("failed to open key store: {e}")))?;
    restrict_permissions(path)?;
    Ok(conn)
}

fn init_schema(conn: &Connection, config: &KeyStoreConfig) -> KeyStoreResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {store} (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS {store}_kdf (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            salt BLOB NOT NULL
        );",
        store = config.store_name
    ))
    .map_err(|e| KeyStoreError::Storage(format!("failed to init key store schema: {e}")))
}

fn load_or_create_salt(conn: &Connection, config: &KeyStoreConfig) -> KeyStoreResult<Salt> {
    let table = format!("{}_kdf", config.store_name);
    let fresh = Salt::random()?;
    conn.execute(
        &format!("INSERT OR IGNORE INTO {table} (id, salt) VALUES (0, ?1)"),
        params![fresh.as_bytes().as_slice()],
    )
    .map_err(|e| KeyStoreError::Storage(format!("failed to write key store salt: {e}")))?;

    let stored: Vec<u8> = conn
        .query_row(&format!("SELECT salt FROM {table} WHERE id = 0"), [], |row| {
            row.get(0)
        })
        .map_err(|e| KeyStoreError::Storage(format!("failed to read key store salt: {e}")))?;
    Ok(Salt::from_slice(&stored)?)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> KeyStoreResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| KeyStoreError::Storage(format!("failed to restrict key store permissions: {e}")))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> KeyStoreResult<()> {
    Ok(())
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    async fn get(&self, name: &str) -> KeyStoreResult<Option<PrivateKeyHandle>> {
        let conn = self.lock()?;
        let value: Option<String> = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE name = ?1", self.config.store_name),
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| KeyStoreError::Storage(format!("failed to read key store entry: {e}")))?;

        match value {
            Some(json) => {
                let sealed: SealedPrivateKey = serde_json::from_str(&json)?;
                Ok(Some(sealed.unseal(&self.wrapping_key)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, key: &PrivateKeyHandle) -> KeyStoreResult<()> {
        let json = serde_json::to_string(&key.seal(&self.wrapping_key)?)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                self.config.store_name
            ),
            params![name, json],
        )
        .map_err(|e| KeyStoreError::Storage(format!("failed to write key store entry: {e}")))?;
        debug!(slot = %name, "Stored sealed key store entry");
        Ok(())
    }

    async fn clear(&self) -> KeyStoreResult<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {}", self.config.store_name), [])
            .map_err(|e| KeyStoreError::Storage(format!("failed to clear key store: {e}")))?;
        info!(store = %self.config.store_name, "Cleared key store");
        Ok(())
    }
}
