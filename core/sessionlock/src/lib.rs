//! Device-bound bearer tokens.
//!
//! A JWT issued to a device embeds that device's public key in a
//! `publicKey` claim. Before every request the device "locks" the JWT by
//! appending the current time and a signature over `jwt.timestamp` made with
//! its private key:
//!
//! ```text
//! <header>.<payload>.<jwt signature>.<client timestamp ms>.<device signature b64>
//! ```
//!
//! A server holding only the locked token can then check that it was
//! produced recently by the device the JWT was issued to. A copied JWT is
//! useless without the private key, and a copied locked token goes stale
//! once the freshness window (3 s by default) has passed.
//!
//! # Pieces
//!
//! - [`KeyPairGenerator`]: enroll the device, keep the private key in a
//!   [`KeyStore`], hand out the public key
//! - [`TokenLocker`]: wrap a JWT into a locked token
//! - [`split_locked_token`]: decompose a locked token
//! - [`TokenVerifier`]: classify a locked token as
//!   [`ValidationResult::Valid`], [`ValidationResult::InvalidSignature`] or
//!   [`ValidationResult::TokenExpired`]
//! - [`DeviceSession`]: the client-side operations behind one handle
//!
//! Callers enforcing access must treat every outcome other than `Valid`,
//! and every error, as unauthorized.

mod claims;
mod error;
mod generator;
mod locker;
mod session;
mod token;
mod verifier;

pub use claims::PUBLIC_KEY_CLAIM;
pub use error::{SessionLockError, SessionLockResult};
pub use generator::KeyPairGenerator;
pub use locker::TokenLocker;
pub use session::DeviceSession;
pub use token::{split_locked_token, ParsedToken, LOCKED_TOKEN_SEGMENTS};
pub use verifier::{TokenVerifier, VerifierConfig};

pub use sessionlock_crypto::{KdfParams, P256Provider, SigningProvider, WrappingKey};
pub use sessionlock_keystore::{KeyStore, KeyStoreConfig, MemoryKeyStore, SqliteKeyStore};
pub use sessionlock_types::{
    Clock, FixedClock, FreshnessWindow, LockTimestamp, SystemClock, ValidationResult,
    DEFAULT_FRESHNESS_WINDOW_MS,
};
