//! Device enrollment.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sessionlock_crypto::{KeyPair, SigningProvider};
use sessionlock_keystore::KeyStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::SessionLockResult;

/// Creates the device key pair and stores its private half.
///
/// Generation is destructive: the stored key is replaced, so every public key
/// handed out earlier stops verifying. Calls on one generator are serialized.
/// Callers driving several generators over the same store must serialize
/// enrollment themselves.
pub struct KeyPairGenerator {
    provider: Arc<dyn SigningProvider>,
    store: Arc<dyn KeyStore>,
    enrollment: Mutex<()>,
}

impl KeyPairGenerator {
    /// Creates a generator over a provider and key store.
    pub fn new(provider: Arc<dyn SigningProvider>, store: Arc<dyn KeyStore>) -> Self {
        Self {
            provider,
            store,
            enrollment: Mutex::new(()),
        }
    }

    /// Generates a key pair, persists the private key, and returns the public
    /// key as standard base64 of its raw point encoding.
    ///
    /// # Errors
    ///
    /// - [`CryptoProviderUnavailable`] if no key can be generated
    /// - [`Storage`] if the private key cannot be persisted; the new key is
    ///   discarded and nothing is enrolled
    ///
    /// [`CryptoProviderUnavailable`]: crate::SessionLockError::CryptoProviderUnavailable
    /// [`Storage`]: crate::SessionLockError::Storage
    pub async fn generate(&self) -> SessionLockResult<String> {
        let _enrolling = self.enrollment.lock().await;

        let KeyPair {
            public_key,
            private_key,
        } = self.provider.generate_key_pair().await?;
        let exported = self.provider.export_public_key(&public_key)?;

        if let Err(e) = self.store.store_private_key(&private_key).await {
            warn!(error = %e, "Failed to persist device key, discarding it");
            return Err(e.into());
        }

        info!(
            algorithm = %public_key.algorithm(),
            slot = %self.store.config().key_slot,
            "Enrolled device key pair"
        );
        Ok(BASE64.encode(exported))
    }
}
