//! Liveness tickets for async results
//!
//! An owner (the session, an open dialog) keeps an [`Epoch`]. Before awaiting
//! a remote call the caller takes a [`Ticket`]; when the result arrives it is
//! committed only if the ticket is still current. Closing the dialog or
//! logging out advances the epoch and so drops every late result.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Epoch(AtomicU64);

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.0.load(Ordering::SeqCst))
    }

    /// Invalidate every ticket handed out so far
    pub fn advance(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}
