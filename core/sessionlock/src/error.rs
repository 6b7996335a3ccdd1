//! Error types for locking and verification.

use sessionlock_crypto::CryptoError;
use sessionlock_keystore::KeyStoreError;
use thiserror::Error;

/// Result type for sessionlock operations.
pub type SessionLockResult<T> = Result<T, SessionLockError>;

/// Errors surfaced by enrollment, locking and verification.
///
/// `InvalidSignature` and `TokenExpired` are normally reported through
/// [`ValidationResult`](sessionlock_types::ValidationResult); they appear here
/// for callers that ask for a plain accept/reject via
/// [`TokenVerifier::authorize`](crate::TokenVerifier::authorize).
#[derive(Debug, Error)]
pub enum SessionLockError {
    /// The cryptographic facility cannot be used.
    #[error("crypto provider unavailable: {0}")]
    CryptoProviderUnavailable(String),

    /// No device key is stored; the device must enroll again.
    #[error("no device key in key store")]
    KeyNotFound,

    /// The key store failed.
    #[error("key store error: {0}")]
    Storage(#[from] KeyStoreError),

    /// Any other signing failure (corrupt stored key, algorithm mismatch).
    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    /// The clock could not be read while locking.
    #[error("clock error: {0}")]
    Clock(#[from] sessionlock_types::Error),

    /// The locked token is structurally invalid or carries no usable key.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The device signature does not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// The client timestamp is outside the freshness window.
    #[error("token expired")]
    TokenExpired,

    /// Verification hit an unexpected failure.
    #[error("verification failed: {source}")]
    VerificationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SessionLockError {
    /// Wraps an unexpected failure raised during verification.
    pub fn verification_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::VerificationFailed {
            source: source.into(),
        }
    }
}

impl From<CryptoError> for SessionLockError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::ProviderUnavailable(msg) => Self::CryptoProviderUnavailable(msg),
            other => Self::Crypto(other),
        }
    }
}
