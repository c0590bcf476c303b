//! An edge-triggered interrupt flag.
//!
//! This is deliberately not a plain `bool`: the contract is set/clear/is_set,
//! and setting it twice before it is cleared must coalesce into a single
//! pending interrupt, not queue two. A new message arriving while a turn is
//! mid-flight should interrupt that turn once, however many more messages
//! pile up before the processing loop gets a chance to look.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InterruptSignal(AtomicBool);

impl InterruptSignal {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Raise the flag. Idempotent: setting an already-set flag is a no-op.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Lower the flag.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
