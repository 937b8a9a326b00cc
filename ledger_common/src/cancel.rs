use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// **A shared cancellation flag**
///
/// Clones observe the same flag. Cancelling alone does not wake a parked
/// waiter; use [`Ledger::interrupt`](crate::ledger::Ledger::interrupt) for that.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
