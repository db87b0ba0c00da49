//! Delivery counters.
//!
//! [`Counters`] is shared between the bus handle, the dispatch task and every delivery
//! worker. [`BusStats`] is a plain copy read with [`Bus::stats`](crate::Bus::stats).
//! Counters are `Relaxed`: they are observability data, not synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a bus's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Messages accepted into the inbound queue.
    pub published: u64,
    /// Messages refused by `publish_timeout` / `try_publish` (timeout or full).
    pub rejected: u64,
    /// Messages discarded because the bus was closed.
    pub dropped_after_close: u64,
    /// Successful callback invocations, summed over all subscribers.
    pub delivered: u64,
    /// Callback invocations that panicked.
    pub panicked: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    published: AtomicU64,
    rejected: AtomicU64,
    dropped_after_close: AtomicU64,
    delivered: AtomicU64,
    panicked: AtomicU64,
}

impl Counters {
    pub(crate) fn published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped_after_close(&self) {
        self.dropped_after_close.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BusStats {
        BusStats {
            published: self.published.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dropped_after_close: self.dropped_after_close.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}
