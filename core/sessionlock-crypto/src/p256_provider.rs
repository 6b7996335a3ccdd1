//! ECDSA P-256 / SHA-256 adapter built on RustCrypto's `p256`.
//!
//! Signatures are the fixed 64-byte `r || s` form and public keys the 65-byte
//! uncompressed SEC1 point, which is what WebCrypto produces for
//! `{ name: "ECDSA", namedCurve: "P-256" }` keys exported as `raw`.

use async_trait::async_trait;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::key::{PrivateKeyHandle, PublicKey, SigningAlgorithm};
use crate::provider::{KeyPair, SigningProvider};

/// Length of an uncompressed P-256 public key (0x04 || x || y).
pub const P256_PUBLIC_KEY_LEN: usize = 65;

/// Length of a fixed-size P-256 ECDSA signature (r || s).
pub const P256_SIGNATURE_LEN: usize = 64;

const SCALAR_LEN: usize = 32;

/// Software P-256 signing provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct P256Provider;

impl P256Provider {
    /// Creates the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_algorithm(&self, actual: SigningAlgorithm) -> CryptoResult<()> {
        if actual != SigningAlgorithm::EcdsaP256Sha256 {
            return Err(CryptoError::AlgorithmMismatch {
                expected: SigningAlgorithm::EcdsaP256Sha256.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    fn signing_key(&self, key: &PrivateKeyHandle) -> CryptoResult<SigningKey> {
        self.check_algorithm(key.algorithm())?;
        SigningKey::from_slice(key.expose_secret())
            .map_err(|_| CryptoError::InvalidPrivateKey("not a P-256 scalar".to_string()))
    }

    fn verifying_key(&self, key: &PublicKey) -> CryptoResult<VerifyingKey> {
        self.check_algorithm(key.algorithm())?;
        VerifyingKey::from_sec1_bytes(key.raw_bytes())
            .map_err(|_| CryptoError::InvalidPublicKey("not a P-256 point".to_string()))
    }
}

fn uncompressed(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes().to_vec()
}

#[async_trait]
impl SigningProvider for P256Provider {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::EcdsaP256Sha256
    }

    async fn generate_key_pair(&self) -> CryptoResult<KeyPair> {
        let mut scalar = Zeroizing::new([0u8; SCALAR_LEN]);
        OsRng
            .try_fill_bytes(&mut scalar[..])
            .map_err(|e| CryptoError::ProviderUnavailable(format!("system randomness: {e}")))?;

        // Zero or out-of-range scalars only come from a broken entropy source.
        let signing = SigningKey::from_slice(&scalar[..]).map_err(|_| {
            CryptoError::ProviderUnavailable("system randomness produced an invalid scalar".into())
        })?;

        let public_key = PublicKey::from_validated_raw(
            SigningAlgorithm::EcdsaP256Sha256,
            uncompressed(signing.verifying_key()),
        );
        let private_key = PrivateKeyHandle::from_secret(
            SigningAlgorithm::EcdsaP256Sha256,
            signing.to_bytes().to_vec(),
        );

        debug!(algorithm = %SigningAlgorithm::EcdsaP256Sha256, "Generated signing key pair");

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    async fn sign(&self, key: &PrivateKeyHandle, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let signing = self.signing_key(key)?;
        let signature: Signature = signing
            .try_sign(message)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }

    async fn verify(
        &self,
        key: &PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> CryptoResult<bool> {
        let verifying = self.verifying_key(key)?;
        let signature = match Signature::from_slice(signature) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        Ok(verifying.verify(message, &signature).is_ok())
    }

    fn import_public_key(&self, raw: &[u8]) -> CryptoResult<PublicKey> {
        let verifying = VerifyingKey::from_sec1_bytes(raw).map_err(|_| {
            CryptoError::InvalidPublicKey(format!("{} bytes are not a P-256 point", raw.len()))
        })?;
        Ok(PublicKey::from_validated_raw(
            SigningAlgorithm::EcdsaP256Sha256,
            uncompressed(&verifying),
        ))
    }

    fn export_public_key(&self, key: &PublicKey) -> CryptoResult<Vec<u8>> {
        let verifying = self.verifying_key(key)?;
        Ok(uncompressed(&verifying))
    }
}
