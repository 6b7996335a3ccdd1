//! Client timestamps carried in the fourth segment of a locked token.
//!
//! The value is whatever the client claimed when it locked the token. It is
//! never trusted as a clock: verifiers only compare it against their own
//! notion of "now" through a freshness window.

use crate::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Milliseconds since the Unix epoch, as written into a locked token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockTimestamp(u64);

impl LockTimestamp {
    /// Creates a timestamp from raw milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Reads the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockUnavailable`] if the system clock reports a time
    /// before the Unix epoch.
    pub fn now() -> Result<Self> {
        let millis = Utc::now().timestamp_millis();
        u64::try_from(millis)
            .map(Self)
            .map_err(|_| Error::ClockUnavailable(format!("system time {millis}ms is before Unix epoch")))
    }

    /// Signed milliseconds from `self` until `now`.
    ///
    /// Positive when `self` lies in the past, negative when the client claimed
    /// a time ahead of `now`.
    #[must_use]
    pub fn elapsed_until(&self, now: LockTimestamp) -> i128 {
        i128::from(now.0) - i128::from(self.0)
    }

    /// Returns a copy shifted forward by `millis`, saturating at `u64::MAX`.
    #[must_use]
    pub const fn plus_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for LockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LockTimestamp {
    type Err = Error;

    /// Parses the decimal form used on the wire. Only ASCII digits are
    /// accepted, so signs, whitespace and exponents are rejected.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidTimestamp(format!("not a decimal integer: {s:?}")));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| Error::InvalidTimestamp(format!("{s:?}: {e}")))
    }
}

impl From<LockTimestamp> for u64 {
    fn from(ts: LockTimestamp) -> Self {
        ts.0
    }
}
