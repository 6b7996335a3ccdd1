//! Signing capability for sessionlock.
//!
//! The token-binding protocol only needs five primitives from a
//! cryptographic facility: generate a key pair, sign, verify, and move public
//! keys in and out of their raw byte form. They are gathered behind the
//! [`SigningProvider`] trait so the protocol code never names a concrete
//! library. [`P256Provider`] is the default adapter (ECDSA over P-256 with
//! SHA-256, the pairing browsers expose through WebCrypto).
//!
//! # Key material
//!
//! - [`PublicKey`] is freely exportable and travels as standard base64 of the
//!   raw uncompressed SEC1 point.
//! - [`PrivateKeyHandle`] is opaque: its `Debug` output is redacted, its
//!   bytes are zeroized on drop, and the only way to get it out of memory is
//!   [`PrivateKeyHandle::seal`], which encrypts it under a [`WrappingKey`].
//!   Key stores persist the resulting [`SealedPrivateKey`].

mod error;
mod key;
mod p256_provider;
mod provider;
mod seal;

pub use error::{CryptoError, CryptoResult};
pub use key::{PrivateKeyHandle, PublicKey, SigningAlgorithm};
pub use p256_provider::{P256Provider, P256_PUBLIC_KEY_LEN, P256_SIGNATURE_LEN};
pub use provider::{KeyPair, SigningProvider};
pub use seal::{KdfParams, Salt, SealedPrivateKey, WrappingKey, SALT_SIZE, WRAPPING_KEY_SIZE};
