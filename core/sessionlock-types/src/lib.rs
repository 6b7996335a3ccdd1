//! Core type definitions for sessionlock.
//!
//! This crate defines the small, dependency-light types shared by the
//! client (locking) and server (verification) halves of the scheme:
//! - Client timestamps in milliseconds since the Unix epoch
//! - The freshness window a verifier applies to those timestamps
//! - The verification outcome
//! - A `Clock` seam so time can be pinned in tests

mod clock;
mod timestamp;
mod validation;
mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use timestamp::LockTimestamp;
pub use validation::ValidationResult;
pub use window::{FreshnessWindow, DEFAULT_FRESHNESS_WINDOW_MS};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("clock unavailable: {0}")]
    ClockUnavailable(String),
}
