//! Locked token wire format.
//!
//! `<jwt header>.<jwt payload>.<jwt signature>.<timestamp ms>.<signature b64>`
//!
//! The first three segments are the issuer's compact JWT, untouched. The
//! device signs the UTF-8 bytes of the first four segments joined by `.`.

use serde::{Deserialize, Serialize};
use sessionlock_types::LockTimestamp;
use std::str::FromStr;

use crate::claims::public_key_claim;
use crate::error::{SessionLockError, SessionLockResult};

/// Number of dot-separated segments in a locked token.
pub const LOCKED_TOKEN_SEGMENTS: usize = 5;

/// A locked token broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedToken {
    /// The issuer's JWT (segments 0-2).
    pub jwt: String,
    /// The exact string the device signed (segments 0-3).
    pub timestamped_jwt: String,
    /// Client-claimed lock time (segment 3).
    pub timestamp: LockTimestamp,
    /// Base64 device signature (segment 4), still encoded.
    pub signature: String,
    /// Base64 device public key taken from the JWT's `publicKey` claim.
    pub public_key: String,
}

impl ParsedToken {
    /// Splits a locked token.
    ///
    /// Pure and synchronous. The token is taken byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLockError::MalformedToken`] when the token contains
    /// whitespace, does not have exactly five segments, the timestamp is not a decimal integer, or
    /// the JWT payload does not carry a `publicKey` claim.
    pub fn parse(locked_token: &str) -> SessionLockResult<Self> {
        if locked_token.chars().any(char::is_whitespace) {
            return Err(SessionLockError::MalformedToken(
                "token must not contain whitespace".into(),
            ));
        }

        let segments: Vec<&str> = locked_token.split('.').collect();
        if segments.len() != LOCKED_TOKEN_SEGMENTS {
            return Err(SessionLockError::MalformedToken(format!(
                "expected {LOCKED_TOKEN_SEGMENTS} dot-separated segments, found {}",
                segments.len()
            )));
        }

        let public_key = public_key_claim(segments[1])?;

        let timestamp = LockTimestamp::from_str(segments[3])
            .map_err(|e| SessionLockError::MalformedToken(format!("bad timestamp segment: {e}")))?;

        Ok(Self {
            jwt: segments[..3].join("."),
            timestamped_jwt: segments[..4].join("."),
            timestamp,
            signature: segments[4].to_string(),
            public_key,
        })
    }
}

impl FromStr for ParsedToken {
    type Err = SessionLockError;

    fn from_str(s: &str) -> SessionLockResult<Self> {
        Self::parse(s)
    }
}

/// Splits a locked token into its fields. See [`ParsedToken::parse`].
pub fn split_locked_token(locked_token: &str) -> SessionLockResult<ParsedToken> {
    ParsedToken::parse(locked_token)
}

/// `jwt.timestamp`, the string a device signs.
pub(crate) fn timestamped_jwt(jwt: &str, timestamp: LockTimestamp) -> String {
    format!("{jwt}.{timestamp}")
}

/// Appends the encoded device signature.
pub(crate) fn compose_locked_token(timestamped_jwt: &str, signature_b64: &str) -> String {
    format!("{timestamped_jwt}.{signature_b64}")
}
