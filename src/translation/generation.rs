use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one request generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Monotonic counter used to recognize superseded results.
///
/// Starting a request takes a new ticket; a result is only current if no
/// newer ticket has been issued since.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }
}
