//! # Pending-message policy for unsubscribe.
//!
//! [`PendingPolicy`] decides what happens to messages that were already fanned out into a
//! subscription's queue but not yet handed to its callback when the subscription is removed.
//!
//! ```text
//! unsubscribe()
//!   ├─ PendingPolicy::Drop  → cancel worker, discard queue  (at most one more callback)
//!   └─ PendingPolicy::Drain → close queue, worker delivers what is buffered, then exits
//! ```
//!
//! `Bus::close` always drains regardless of this policy.

/// What to do with buffered-but-undelivered messages when a subscription is removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PendingPolicy {
    /// Discard buffered messages (default).
    ///
    /// After `unsubscribe` returns, at most one invocation that the worker was already
    /// handing over may still start; a callback already running finishes.
    #[default]
    Drop,
    /// Deliver messages already in the queue, then stop.
    Drain,
}

impl PendingPolicy {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PendingPolicy::Drop => "drop",
            PendingPolicy::Drain => "drain",
        }
    }
}
