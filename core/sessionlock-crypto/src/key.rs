//! Key material types.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Signature scheme a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// ECDSA over NIST P-256 with SHA-256, fixed-size `r || s` signatures.
    #[serde(rename = "ES256")]
    EcdsaP256Sha256,
}

impl SigningAlgorithm {
    /// JOSE-style short name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcdsaP256Sha256 => "ES256",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An imported or exported public verification key.
///
/// Holds the raw point encoding produced by the provider that created or
/// imported it. Construct one through [`SigningProvider::import_public_key`]
/// so the bytes are known to be a valid point.
///
/// [`SigningProvider::import_public_key`]: crate::SigningProvider::import_public_key
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    algorithm: SigningAlgorithm,
    raw: Vec<u8>,
}

impl PublicKey {
    /// Wraps already-validated raw bytes. Providers call this after checking
    /// the encoding.
    #[must_use]
    pub fn from_validated_raw(algorithm: SigningAlgorithm, raw: Vec<u8>) -> Self {
        Self { algorithm, raw }
    }

    /// Returns the algorithm this key verifies.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the raw point bytes.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Standard (padded) base64 of the raw bytes, the form carried in JWT
    /// claims and enrollment requests.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.raw)
    }

    /// Decodes standard base64 into raw bytes without validating the point.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] if the input is not base64.
    pub fn decode_base64(encoded: &str) -> CryptoResult<Vec<u8>> {
        BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidPublicKey(format!("invalid base64: {e}")))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .field("raw", &self.to_base64())
            .finish()
    }
}

/// Opaque handle to a device private key.
///
/// The handle never leaves the device: it is created by a provider, sealed
/// into a key store, and read back only to sign. Its bytes are wiped on drop,
/// never printed, and only leave this crate encrypted (see
/// [`PrivateKeyHandle::seal`]).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyHandle {
    #[zeroize(skip)]
    algorithm: SigningAlgorithm,
    secret: Vec<u8>,
}

impl PrivateKeyHandle {
    /// Wraps provider-specific secret material.
    #[must_use]
    pub fn from_secret(algorithm: SigningAlgorithm, secret: Vec<u8>) -> Self {
        Self { algorithm, secret }
    }

    /// Returns the algorithm this key signs with.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Secret material for the providers and sealing code in this crate.
    pub(crate) fn expose_secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for PrivateKeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyHandle")
            .field("algorithm", &self.algorithm)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for PrivateKeyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.secret == other.secret
    }
}

impl Eq for PrivateKeyHandle {}
