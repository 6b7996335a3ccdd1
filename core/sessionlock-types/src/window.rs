//! Freshness window applied by verifiers.

use serde::{Deserialize, Serialize};

/// Default maximum age of a locked token, in milliseconds.
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 3_000;

/// Maximum age a locked token's client timestamp may have at verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreshnessWindow(u64);

impl FreshnessWindow {
    /// Creates a window of `millis` milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the window length in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// True when a token that is `elapsed_ms` old falls outside the window.
    ///
    /// The bound is inclusive: a token exactly `window` milliseconds old is
    /// still fresh.
    #[must_use]
    pub fn is_exceeded_by(&self, elapsed_ms: i128) -> bool {
        elapsed_ms > i128::from(self.0)
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self(DEFAULT_FRESHNESS_WINDOW_MS)
    }
}
