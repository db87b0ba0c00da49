//! # fanbus
//!
//! **fanbus** is an in-process publish/subscribe bus for tokio applications.
//!
//! Producers publish without knowing who listens; consumers subscribe independently and
//! receive every message published after they subscribed. Each subscriber is served by its
//! own delivery worker reading from its own bounded queue, so a slow or panicking subscriber
//! never holds up the others.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  producer #1 │   │  producer #2 │   │  producer #3 │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ publish          │ publish_timeout  │ try_publish
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus                                                              │
//! │  - inbound queue (bounded: BusConfig::inbound_capacity)           │
//! │  - dispatch task (one per bus)                                    │
//! │  - Registry (RwLock: subscriptions + next id)                     │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ snapshot under read lock, then
//!                                   │ concurrent write into every queue
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!            [queue S1]        [queue S2]        [queue SN]    (BusConfig::subscriber_capacity)
//!                 │                 │                 │
//!             worker S1         worker S2         worker SN    (one tokio task each)
//!                 ▼                 ▼                 ▼
//!           on_message()      on_message()      on_message()   (serial per subscriber)
//! ```
//!
//! ### Lifecycle of a subscription
//! ```text
//! subscribe(sub) ──► id = seq + 1 ──► queue + worker ──► Active
//!                                                          │
//!            unsubscribe() / Bus::close() ─────────────────┴──► Unsubscribed (terminal)
//!                 ├─ PendingPolicy::Drop  → buffered messages discarded
//!                 ├─ PendingPolicy::Drain → buffered messages delivered, then exit
//!                 └─ Bus::close           → always drains, awaited within BusConfig::grace
//! ```
//!
//! ## Guarantees
//! | Property            | Description                                                                 |
//! |---------------------|-----------------------------------------------------------------------------|
//! | **Snapshot**        | A message reaches the subscriptions active when the dispatch task fans it out. |
//! | **FIFO**            | Each subscriber sees messages in publish order.                             |
//! | **No early delivery** | A subscriber never gets a message whose publish started before it subscribed. |
//! | **Isolation**       | Callback panics are caught and logged; other subscribers are unaffected.   |
//! | **Backpressure**    | Full queues make `publish` wait and `publish_timeout` return `false`.       |
//! | **Close**           | `publish` after `close` is a silent no-op.                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use fanbus::Bus;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus: Bus<u32> = Bus::with_capacity(16);
//!
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink = Arc::clone(&seen);
//!     let sub = bus
//!         .subscribe_fn("collector", move |msg: Arc<u32>| {
//!             let sink = Arc::clone(&sink);
//!             async move { sink.lock().unwrap().push(*msg) }
//!         })
//!         .await;
//!
//!     bus.publish(1).await;
//!     assert!(bus.publish_timeout(2, Duration::from_millis(10)).await);
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
//!
//!     sub.unsubscribe().await;
//!     bus.close().await.unwrap();
//! }
//! ```
mod core;
mod error;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Bus, BusBuilder, BusConfig, BusRegistry, BusStats, DEFAULT_BUS_NAME};
pub use error::{BusError, PublishError};
pub use policies::PendingPolicy;
pub use subscribers::{Subscribe, SubscriberFn, Subscription, SubscriptionId};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
