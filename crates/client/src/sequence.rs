//! Last-request-wins ticketing.
//!
//! A view that refetches on every filter change can have an older request
//! resolve after a newer one. Each logical query owns a [`RequestSequencer`];
//! a response is applied only while its ticket is still the current one, so
//! stale responses and responses for views that were navigated away from are
//! dropped instead of clobbering shared state.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestSequencer {
    current: AtomicU64,
}

/// Ticket for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request, invalidating all earlier tickets.
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a response holding this ticket may still be applied.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidate all outstanding tickets without issuing a new one, e.g.
    /// when the owning view is dismissed.
    pub fn cancel_all(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_wins() {
        let seq = RequestSequencer::new();
        let first = seq.begin();
        let second = seq.begin();

        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn test_cancel_all_invalidates() {
        let seq = RequestSequencer::new();
        let ticket = seq.begin();
        assert!(seq.is_current(ticket));

        seq.cancel_all();
        assert!(!seq.is_current(ticket));
    }

    #[test]
    fn test_single_request_stays_current() {
        let seq = RequestSequencer::new();
        let ticket = seq.begin();
        assert!(seq.is_current(ticket));
        assert!(seq.is_current(ticket));
    }
}
