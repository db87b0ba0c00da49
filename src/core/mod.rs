//! Bus core: queues, dispatch and lifecycle.
//!
//! Public API from this module: [`Bus`], [`BusBuilder`], [`BusConfig`], [`BusStats`]
//! and the named-bus store [`BusRegistry`].
//!
//! Internal modules:
//! - [`registry`]: subscriptions and id allocation under a `RwLock`;
//! - [`dispatch`]: the per-bus task moving messages from the inbound queue to subscriber queues;
//! - [`stats`]: shared delivery counters.

mod builder;
mod bus;
mod config;
mod dispatch;
mod named;
mod registry;
mod stats;

pub use builder::BusBuilder;
pub use bus::Bus;
pub use config::BusConfig;
pub use named::{BusRegistry, DEFAULT_BUS_NAME};
pub use stats::BusStats;

pub(crate) use registry::Registry;
pub(crate) use stats::Counters;
