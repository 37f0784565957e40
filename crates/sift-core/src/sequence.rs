//! Request sequencing for overlapping async operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one dispatched request within a [`SequenceGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Orders the requests issued for one logical slot.
///
/// Every request takes a ticket before it is sent. When its response
/// arrives it is applied only if no later ticket has been issued since.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    latest: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request, superseding all earlier ones.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Check if `ticket` belongs to the most recently issued request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
