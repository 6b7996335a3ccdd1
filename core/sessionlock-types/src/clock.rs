//! Time source used when locking and verifying tokens.

use crate::{LockTimestamp, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying time source cannot be read.
    fn now(&self) -> Result<LockTimestamp>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<LockTimestamp> {
        LockTimestamp::now()
    }
}

/// A manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicU64,
}

impl FixedClock {
    /// Creates a clock pinned at `at`.
    #[must_use]
    pub fn new(at: LockTimestamp) -> Self {
        Self {
            millis: AtomicU64::new(at.as_millis()),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: LockTimestamp) {
        self.millis.store(at.as_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Result<LockTimestamp> {
        Ok(LockTimestamp::from_millis(self.millis.load(Ordering::SeqCst)))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Result<LockTimestamp> {
        (**self).now()
    }
}
