//! Shared test helpers for signing tests.

#![allow(dead_code)]

use sessionlock_crypto::{PrivateKeyHandle, SigningAlgorithm};

/// Returns a deterministic P-256 private key from a fixed scalar.
pub fn fixed_private_key() -> PrivateKeyHandle {
    let scalar: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    PrivateKeyHandle::from_secret(SigningAlgorithm::EcdsaP256Sha256, scalar.to_vec())
}
