//! Server-side verification of locked tokens.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sessionlock_crypto::{CryptoError, PublicKey, SigningProvider};
use sessionlock_types::{Clock, FreshnessWindow, LockTimestamp, ValidationResult};
use std::sync::Arc;
use tracing::debug;

use crate::error::{SessionLockError, SessionLockResult};
use crate::token::ParsedToken;

/// Verifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Window applied when the caller does not pass one.
    pub freshness_window: FreshnessWindow,
    /// How far ahead of the verifier's clock a client timestamp may be
    /// before the token counts as expired. `None` accepts any future
    /// timestamp.
    pub max_future_skew_ms: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            freshness_window: FreshnessWindow::default(),
            max_future_skew_ms: Some(FreshnessWindow::default().as_millis()),
        }
    }
}

/// Checks locked tokens against the key bound into their JWT.
pub struct TokenVerifier {
    provider: Arc<dyn SigningProvider>,
    clock: Arc<dyn Clock>,
    config: VerifierConfig,
}

impl TokenVerifier {
    /// Creates a verifier with the default configuration.
    pub fn new(provider: Arc<dyn SigningProvider>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(provider, clock, VerifierConfig::default())
    }

    /// Creates a verifier with a custom configuration.
    pub fn with_config(
        provider: Arc<dyn SigningProvider>,
        clock: Arc<dyn Clock>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies with the configured freshness window.
    pub async fn verify(&self, locked_token: &str) -> SessionLockResult<ValidationResult> {
        self.verify_with_window(locked_token, self.config.freshness_window)
            .await
    }

    /// Verifies with an explicit freshness window.
    ///
    /// # Errors
    ///
    /// - [`SessionLockError::MalformedToken`] if the token cannot be split or
    ///   its `publicKey` claim is not a valid key
    /// - [`SessionLockError::VerificationFailed`] for provider or clock
    ///   failures
    pub async fn verify_with_window(
        &self,
        locked_token: &str,
        window: FreshnessWindow,
    ) -> SessionLockResult<ValidationResult> {
        let parsed = ParsedToken::parse(locked_token)?;
        self.verify_parsed(&parsed, window).await
    }

    /// Verifies an already split token.
    ///
    /// The freshness check and the signature check both run for every token,
    /// and expiry takes precedence: a token that is both stale and forged is
    /// reported as [`ValidationResult::TokenExpired`].
    pub async fn verify_parsed(
        &self,
        parsed: &ParsedToken,
        window: FreshnessWindow,
    ) -> SessionLockResult<ValidationResult> {
        let public_key = self.import_claimed_key(&parsed.public_key)?;

        let now = self
            .clock
            .now()
            .map_err(SessionLockError::verification_failed)?;
        let elapsed_ms = parsed.timestamp.elapsed_until(now);
        let expired = window.is_exceeded_by(elapsed_ms) || self.is_ahead_of_skew(parsed.timestamp, now);

        // An undecodable signature is just a signature that fails to verify.
        let signature = BASE64.decode(&parsed.signature).unwrap_or_default();
        let signature_valid = self
            .provider
            .verify(&public_key, parsed.timestamped_jwt.as_bytes(), &signature)
            .await
            .map_err(SessionLockError::verification_failed)?;

        let result = if expired {
            ValidationResult::TokenExpired
        } else if !signature_valid {
            ValidationResult::InvalidSignature
        } else {
            ValidationResult::Valid
        };

        debug!(
            result = %result,
            elapsed_ms = %elapsed_ms,
            window_ms = window.as_millis(),
            "Verified locked token"
        );
        Ok(result)
    }

    /// Accept/reject form of [`verify`](Self::verify) for authorization
    /// gates: returns the parsed token only when it is valid.
    ///
    /// # Errors
    ///
    /// Every non-valid outcome is an error: [`SessionLockError::TokenExpired`],
    /// [`SessionLockError::InvalidSignature`], or whatever verification raised.
    pub async fn authorize(&self, locked_token: &str) -> SessionLockResult<ParsedToken> {
        let parsed = ParsedToken::parse(locked_token)?;
        match self
            .verify_parsed(&parsed, self.config.freshness_window)
            .await?
        {
            ValidationResult::Valid => Ok(parsed),
            ValidationResult::InvalidSignature => Err(SessionLockError::InvalidSignature),
            ValidationResult::TokenExpired => Err(SessionLockError::TokenExpired),
        }
    }

    fn import_claimed_key(&self, encoded: &str) -> SessionLockResult<PublicKey> {
        let raw = PublicKey::decode_base64(encoded)
            .map_err(|e| SessionLockError::MalformedToken(format!("publicKey claim: {e}")))?;
        self.provider.import_public_key(&raw).map_err(|e| match e {
            CryptoError::InvalidPublicKey(_) => {
                SessionLockError::MalformedToken(format!("publicKey claim: {e}"))
            }
            other => SessionLockError::verification_failed(other),
        })
    }

    fn is_ahead_of_skew(&self, timestamp: LockTimestamp, now: LockTimestamp) -> bool {
        match self.config.max_future_skew_ms {
            Some(skew) => timestamp > now.plus_millis(skew),
            None => false,
        }
    }
}
