//! Error types for key stores.

use sessionlock_crypto::CryptoError;
use thiserror::Error;

/// Result type for key store operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors that can occur while reading or writing a key store.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The backing storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The store configuration is unusable.
    #[error("invalid key store configuration: {0}")]
    InvalidConfig(String),

    /// An entry could not be sealed, or a stored entry could not be opened
    /// (wrong passphrase or tampered file).
    #[error("key sealing error: {0}")]
    Sealing(#[from] CryptoError),

    /// A stored entry could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

