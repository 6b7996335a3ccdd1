//! Client-side locking of JWTs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sessionlock_crypto::SigningProvider;
use sessionlock_keystore::KeyStore;
use sessionlock_types::Clock;
use std::sync::Arc;
use tracing::debug;

use crate::error::{SessionLockError, SessionLockResult};
use crate::token::{compose_locked_token, timestamped_jwt};

/// Binds a JWT to this device and the current time.
///
/// Locking only reads the key store, so concurrent calls are safe. Every call
/// produces a fresh token; nothing is cached.
pub struct TokenLocker {
    provider: Arc<dyn SigningProvider>,
    store: Arc<dyn KeyStore>,
    clock: Arc<dyn Clock>,
}

impl TokenLocker {
    /// Creates a locker.
    pub fn new(
        provider: Arc<dyn SigningProvider>,
        store: Arc<dyn KeyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            store,
            clock,
        }
    }

    /// Locks `jwt`, returning `jwt.timestamp.signature`.
    ///
    /// The JWT is treated as an opaque string; checking that it is a
    /// well-formed JWT is the issuer's job.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLockError::KeyNotFound`] if the device has not
    /// enrolled (or its key store was cleared).
    pub async fn lock(&self, jwt: &str) -> SessionLockResult<String> {
        let timestamp = self.clock.now()?;
        let timestamped = timestamped_jwt(jwt, timestamp);

        let key = self
            .store
            .load_private_key()
            .await?
            .ok_or(SessionLockError::KeyNotFound)?;

        let signature = self.provider.sign(&key, timestamped.as_bytes()).await?;

        debug!(timestamp = %timestamp, "Locked token");
        Ok(compose_locked_token(&timestamped, &BASE64.encode(signature)))
    }
}
