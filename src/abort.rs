use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("search cancelled")]
    Cancelled,
    #[error("search timed out")]
    TimedOut,
}

/// Abort signal shared between the caller of a long-running search and the
/// workers executing it. Cloning shares the same cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails once the handle was cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), AbortReason> {
        if self.is_cancelled() {
            return Err(AbortReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(AbortReason::TimedOut),
            _ => Ok(()),
        }
    }
}
