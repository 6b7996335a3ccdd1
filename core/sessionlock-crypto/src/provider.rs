//! Signing capability abstraction.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CryptoResult;
use crate::key::{PrivateKeyHandle, PublicKey, SigningAlgorithm};

/// A freshly generated key pair.
///
/// The private half is meant to go straight into a key store; only the
/// public half is ever handed back to callers.
#[derive(Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKeyHandle,
}

/// Abstract signing facility.
///
/// Implementations wrap a concrete library or a platform key service. The
/// asynchronous methods allow adapters for facilities that do I/O (hardware
/// modules, OS key services); pure software adapters simply complete
/// immediately.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// The single algorithm this provider implements.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Generates a new signing key pair.
    async fn generate_key_pair(&self) -> CryptoResult<KeyPair>;

    /// Signs `message` with `key`, returning the raw signature bytes.
    async fn sign(&self, key: &PrivateKeyHandle, message: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Checks `signature` over `message`.
    ///
    /// Returns `Ok(false)` when the signature does not verify, including when
    /// it is not even well-formed for the algorithm.
    async fn verify(&self, key: &PublicKey, message: &[u8], signature: &[u8])
        -> CryptoResult<bool>;

    /// Validates raw public key bytes and wraps them for verification.
    fn import_public_key(&self, raw: &[u8]) -> CryptoResult<PublicKey>;

    /// Returns the raw encoding of a public key.
    fn export_public_key(&self, key: &PublicKey) -> CryptoResult<Vec<u8>>;
}

#[async_trait]
impl<P: SigningProvider + ?Sized> SigningProvider for Arc<P> {
    fn algorithm(&self) -> SigningAlgorithm {
        (**self).algorithm()
    }

    async fn generate_key_pair(&self) -> CryptoResult<KeyPair> {
        (**self).generate_key_pair().await
    }

    async fn sign(&self, key: &PrivateKeyHandle, message: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).sign(key, message).await
    }

    async fn verify(
        &self,
        key: &PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> CryptoResult<bool> {
        (**self).verify(key, message, signature).await
    }

    fn import_public_key(&self, raw: &[u8]) -> CryptoResult<PublicKey> {
        (**self).import_public_key(raw)
    }

    fn export_public_key(&self, key: &PublicKey) -> CryptoResult<Vec<u8>> {
        (**self).export_public_key(key)
    }
}
