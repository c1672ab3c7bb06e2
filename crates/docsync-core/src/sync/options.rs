use crate::{DEFAULT_STORE_TIMEOUT_MS, plan::ReservedIndexes};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

///
/// SyncOptions
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncOptions {
    /// Deadline passed to every individual store call.
    pub timeout: Duration,
    pub reserved: ReservedIndexes,
}

impl SyncOptions {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reserved(mut self, reserved: ReservedIndexes) -> Self {
        self.reserved = reserved;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            reserved: ReservedIndexes::default(),
        }
    }
}

///
/// CancelFlag
///
/// Shared cancellation signal. Checked between store operations; an
/// operation already issued is never rolled back.
///

#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the signal so the flag can be reused for another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
