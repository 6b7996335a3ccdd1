//! Sealed storage form of device private keys.
//!
//! A key store never sees raw key bytes. It asks the handle to seal itself
//! under a [`WrappingKey`] (ChaCha20-Poly1305, algorithm name as associated
//! data) and persists the resulting [`SealedPrivateKey`]. Wrapping keys are
//! either random or derived from a passphrase with Argon2id.

use argon2::{Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};
use crate::key::{PrivateKeyHandle, SigningAlgorithm};

/// Size of a wrapping key in bytes (256 bits for ChaCha20).
pub const WRAPPING_KEY_SIZE: usize = 32;

/// Size of a key-derivation salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Size of a sealing nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Key that seals private keys at rest. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WrappingKey {
    bytes: [u8; WRAPPING_KEY_SIZE],
}

impl WrappingKey {
    /// Generates a random wrapping key, for stores that never outlive the
    /// process or that keep the wrapping key elsewhere.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; WRAPPING_KEY_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Derives a wrapping key from a passphrase using Argon2id.
    pub fn derive(passphrase: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<Self> {
        let argon2_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(WRAPPING_KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params);

        let mut bytes = [0u8; WRAPPING_KEY_SIZE];
        argon2
            .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut bytes)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        Ok(Self { bytes })
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new((&self.bytes).into())
    }
}

impl fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappingKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for passphrase derivation. Stored next to the sealed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a random salt.
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Creates a salt from stored bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if `bytes` is not
    /// [`SALT_SIZE`] long.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes = bytes.try_into().map_err(|_| {
            CryptoError::KeyDerivation(format!("salt must be {SALT_SIZE} bytes, got {}", bytes.len()))
        })?;
        Ok(Self { bytes })
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id (2023)
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// A private key encrypted under a [`WrappingKey`].
///
/// Safe to persist: without the wrapping key it reveals only the algorithm.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPrivateKey {
    algorithm: SigningAlgorithm,
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl SealedPrivateKey {
    /// Returns the algorithm of the sealed key.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Decrypts the key back into a handle.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Unsealing`] for a wrong wrapping key or
    /// tampered data.
    pub fn unseal(&self, key: &WrappingKey) -> CryptoResult<PrivateKeyHandle> {
        let secret = key
            .cipher()
            .decrypt(
                Nonce::from_slice(&self.nonce),
                Payload {
                    msg: &self.ciphertext,
                    aad: self.algorithm.as_str().as_bytes(),
                },
            )
            .map_err(|_| {
                CryptoError::Unsealing("wrong wrapping key or tampered data".to_string())
            })?;
        Ok(PrivateKeyHandle::from_secret(self.algorithm, secret))
    }
}

impl fmt::Debug for SealedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedPrivateKey")
            .field("algorithm", &self.algorithm)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

impl PrivateKeyHandle {
    /// Encrypts the key for storage under `key`.
    pub fn seal(&self, key: &WrappingKey) -> CryptoResult<SealedPrivateKey> {
        let mut nonce = [0u8; NONCE_SIZE];
        fill_random(&mut nonce)?;

        let ciphertext = key
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: self.expose_secret(),
                    aad: self.algorithm().as_str().as_bytes(),
                },
            )
            .map_err(|e| CryptoError::Sealing(e.to_string()))?;

        Ok(SealedPrivateKey {
            algorithm: self.algorithm(),
            nonce,
            ciphertext,
        })
    }
}

fn fill_random(out: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(out)
        .map_err(|e| CryptoError::ProviderUnavailable(format!("system randomness: {e}")))
}
