//! Verification outcome for a locked token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking a well-formed locked token.
///
/// Only the two "untrusted input" outcomes live here. Structurally malformed
/// tokens and provider failures are reported as errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationResult {
    /// Fresh and signed by the key bound into the JWT.
    Valid,
    /// Fresh, but the device signature does not verify.
    InvalidSignature,
    /// The client timestamp is outside the freshness window.
    TokenExpired,
}

impl ValidationResult {
    /// Returns true only for [`ValidationResult::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Stable wire name of the outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
