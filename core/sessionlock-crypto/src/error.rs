//! Error types for the signing layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// A signature that simply does not verify is not an error; providers report
/// it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The underlying facility (randomness, hardware module) cannot be used.
    #[error("crypto provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Public key bytes are not a valid point for the algorithm.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Private key material could not be loaded.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A key made for one algorithm was handed to a provider for another.
    #[error("algorithm mismatch: expected {expected}, got {actual}")]
    AlgorithmMismatch { expected: String, actual: String },

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A private key could not be sealed for storage.
    #[error("sealing failed: {0}")]
    Sealing(String),

    /// A sealed private key could not be opened.
    #[error("unsealing failed: {0}")]
    Unsealing(String),

    /// A wrapping key could not be derived from a passphrase.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}
