//! Client-side handle over enrollment and locking.

use sessionlock_crypto::{P256Provider, SigningProvider};
use sessionlock_keystore::KeyStore;
use sessionlock_types::{Clock, SystemClock};
use std::sync::Arc;
use tracing::info;

use crate::error::SessionLockResult;
use crate::generator::KeyPairGenerator;
use crate::locker::TokenLocker;

/// Everything a device needs: enroll, lock outgoing tokens, forget its key.
pub struct DeviceSession {
    store: Arc<dyn KeyStore>,
    generator: KeyPairGenerator,
    locker: TokenLocker,
}

impl DeviceSession {
    /// Creates a session using P-256 and the system clock.
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self::with_parts(Arc::new(P256Provider::new()), store, Arc::new(SystemClock))
    }

    /// Creates a session from explicit parts.
    pub fn with_parts(
        provider: Arc<dyn SigningProvider>,
        store: Arc<dyn KeyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            generator: KeyPairGenerator::new(provider.clone(), store.clone()),
            locker: TokenLocker::new(provider, store.clone(), clock),
            store,
        }
    }

    /// Enrolls the device. Returns the base64 public key to send to the
    /// issuer, which must embed it as the JWT's `publicKey` claim.
    pub async fn generate_key_pair(&self) -> SessionLockResult<String> {
        self.generator.generate().await
    }

    /// Locks `jwt` for one outgoing request.
    pub async fn lock_token(&self, jwt: &str) -> SessionLockResult<String> {
        self.locker.lock(jwt).await
    }

    /// Forgets the device key. Later locks fail with `KeyNotFound`.
    pub async fn clear_key_store(&self) -> SessionLockResult<()> {
        self.store.clear().await?;
        info!("Cleared device key");
        Ok(())
    }

    /// True when a device key is stored.
    pub async fn is_enrolled(&self) -> SessionLockResult<bool> {
        Ok(self.store.load_private_key().await?.is_some())
    }
}
