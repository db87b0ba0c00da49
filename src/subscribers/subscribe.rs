//! # Subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for consuming messages published on a
//! [`Bus`](crate::Bus).
//!
//! Each subscription gets:
//! - **Dedicated delivery worker** (one tokio task, lives as long as the subscription)
//! - **Private bounded queue** (bus default, or [`Subscribe::queue_capacity`])
//! - **Panic isolation** (a panic is logged and counted; the worker keeps going)
//!
//! ## Architecture
//! ```text
//! dispatch ──► [bounded queue] ──► delivery worker ──► subscriber.on_message()
//!                                                  └─► panic caught → warn + BusStats::panicked
//! ```
//!
//! ## Rules
//! - Messages are processed one at a time, in publish order (per-subscriber FIFO).
//! - A slow subscriber only fills its own queue; once that queue is full the dispatch
//!   task waits for it, which eventually pushes back on producers.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use fanbus::Subscribe;
//!
//! struct Totals {
//!     sum: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Subscribe<u64> for Totals {
//!     async fn on_message(&self, msg: Arc<u64>) {
//!         self.sum.fetch_add(*msg, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &str { "totals" }
//!     fn queue_capacity(&self) -> Option<usize> { Some(4096) }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

/// Message consumer attached to a bus.
///
/// ### Implementation requirements
/// - Use async waits; a callback that blocks its thread stalls a runtime worker.
/// - Handle errors internally. Panics are caught, but the message is lost for this subscriber.
#[async_trait]
pub trait Subscribe<M>: Send + Sync + 'static
where
    M: Send + Sync + 'static,
{
    /// Processes a single message.
    ///
    /// Called from this subscription's delivery worker, never from the publisher.
    /// The next message is not handed over until this future completes.
    async fn on_message(&self, msg: Arc<M>);

    /// Returns the subscriber name used in logs and in `BusError::GraceExceeded`.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns a queue capacity for this subscriber, overriding the bus default.
    ///
    /// `None` uses `BusConfig::subscriber_capacity`. The bus clamps it to a minimum of 1.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
