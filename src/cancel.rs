//! Cooperative cancellation flag shared between the interrupt handler and
//! in-flight snapshot tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag that marks the run as cancelled.
///
/// Snapshot tasks check the flag at their step boundaries; a set flag makes
/// them return early so their scoped temporary directories are released.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the run as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
