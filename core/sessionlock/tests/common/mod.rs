//! Shared test helpers for locking and verification tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sessionlock::{
    DeviceSession, FixedClock, KeyStore, KeyStoreConfig, LockTimestamp, MemoryKeyStore,
    P256Provider, SigningProvider, TokenVerifier, VerifierConfig,
};
use sessionlock_crypto::{
    CryptoError, CryptoResult, KeyPair, PrivateKeyHandle, PublicKey, SigningAlgorithm,
};
use sessionlock_keystore::{KeyStoreError, KeyStoreResult};
use std::sync::Arc;

/// Lock time used by scenario tests.
pub const T0: u64 = 1_684_000_000_000;

/// Builds an unsigned-looking compact JWT carrying the given claims.
///
/// The third segment is filler: the issuer's signature is never checked by
/// the locking layer.
pub fn make_jwt_with_claims(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(b"issuer-signature-not-checked-here");
    format!("{header}.{payload}.{signature}")
}

/// A JWT as the demo issuer would mint it after login.
pub fn make_jwt(public_key: &str) -> String {
    make_jwt_with_claims(serde_json::json!({
        "id": 1,
        "username": "alice",
        "publicKey": public_key,
        "iat": 1_684_000_000,
        "exp": 1_684_003_600,
    }))
}

/// A device and a server sharing one pinned clock.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub store: Arc<MemoryKeyStore>,
    pub session: DeviceSession,
    pub verifier: TokenVerifier,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_verifier_config(VerifierConfig::default())
    }

    pub fn with_verifier_config(config: VerifierConfig) -> Self {
        let clock = Arc::new(FixedClock::new(LockTimestamp::from_millis(T0)));
        let store = Arc::new(MemoryKeyStore::new());
        let provider: Arc<dyn SigningProvider> = Arc::new(P256Provider::new());
        let session = DeviceSession::with_parts(provider.clone(), store.clone(), clock.clone());
        let verifier = TokenVerifier::with_config(provider, clock.clone(), config);
        Self {
            clock,
            store,
            session,
            verifier,
        }
    }

    /// Enrolls the device and returns a JWT bound to its key.
    pub async fn enroll(&self) -> String {
        let public_key = self.session.generate_key_pair().await.unwrap();
        make_jwt(&public_key)
    }

    /// Enrolls, then locks a token at `T0`.
    pub async fn locked_token(&self) -> String {
        let jwt = self.enroll().await;
        self.clock.set(LockTimestamp::from_millis(T0));
        self.session.lock_token(&jwt).await.unwrap()
    }

    /// Moves the shared clock to `T0 + offset_ms`.
    pub fn at(&self, offset_ms: u64) {
        self.clock.set(LockTimestamp::from_millis(T0 + offset_ms));
    }
}

/// Replaces the character at `index` with a different base64-alphabet
/// character that is not a segment separator.
pub fn flip_char(token: &str, index: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    bytes[index] = match bytes[index] {
        b'A' => b'B',
        b'0' => b'1',
        b'9' => b'8',
        b'=' => b'A',
        c if c.is_ascii_digit() => c - 1,
        _ => b'A',
    };
    String::from_utf8(bytes).unwrap()
}

/// Byte range of segment `n` within a dot-separated token.
pub fn segment_range(token: &str, n: usize) -> std::ops::Range<usize> {
    let mut start = 0;
    for (i, segment) in token.split('.').enumerate() {
        if i == n {
            return start..start + segment.len();
        }
        start += segment.len() + 1;
    }
    panic!("token has no segment {n}");
}

/// Key store whose writes always fail.
pub struct ReadOnlyKeyStore {
    config: KeyStoreConfig,
}

impl ReadOnlyKeyStore {
    pub fn new() -> Self {
        Self {
            config: KeyStoreConfig::default(),
        }
    }
}

#[async_trait]
impl KeyStore for ReadOnlyKeyStore {
    fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    async fn get(&self, _name: &str) -> KeyStoreResult<Option<PrivateKeyHandle>> {
        Ok(None)
    }

    async fn set(&self, _name: &str, _key: &PrivateKeyHandle) -> KeyStoreResult<()> {
        Err(KeyStoreError::Storage("read-only volume".into()))
    }

    async fn clear(&self) -> KeyStoreResult<()> {
        Ok(())
    }
}

/// Provider that can import keys but whose signing facility is offline.
pub struct OfflineProvider;

#[async_trait]
impl SigningProvider for OfflineProvider {
    fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::EcdsaP256Sha256
    }

    async fn generate_key_pair(&self) -> CryptoResult<KeyPair> {
        Err(CryptoError::ProviderUnavailable("module offline".into()))
    }

    async fn sign(&self, _key: &PrivateKeyHandle, _message: &[u8]) -> CryptoResult<Vec<u8>> {
        Err(CryptoError::ProviderUnavailable("module offline".into()))
    }

    async fn verify(
        &self,
        _key: &PublicKey,
        _message: &[u8],
        _signature: &[u8],
    ) -> CryptoResult<bool> {
        Err(CryptoError::ProviderUnavailable("module offline".into()))
    }

    fn import_public_key(&self, raw: &[u8]) -> CryptoResult<PublicKey> {
        P256Provider::new().import_public_key(raw)
    }

    fn export_public_key(&self, key: &PublicKey) -> CryptoResult<Vec<u8>> {
        P256Provider::new().export_public_key(key)
    }
}
