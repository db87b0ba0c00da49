use std::time::Duration;

use crate::core::{Bus, BusConfig};
use crate::policies::PendingPolicy;

/// Builder for constructing a [`Bus`] with non-default settings.
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use fanbus::{Bus, PendingPolicy};
///
/// let bus: Bus<String> = Bus::<String>::builder()
///     .with_inbound_capacity(256)
///     .with_subscriber_capacity(32)
///     .with_grace(Duration::from_secs(1))
///     .with_pending_policy(PendingPolicy::Drain)
///     .build();
/// assert_eq!(bus.config().subscriber_capacity_clamped(), 32);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BusBuilder {
    cfg: BusConfig,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self { cfg }
    }

    /// Sets the inbound (producer-facing) queue capacity.
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.cfg.inbound_capacity = capacity;
        self
    }

    /// Sets the default capacity of each subscriber's private queue (`0` = inbound capacity).
    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.cfg.subscriber_capacity = capacity;
        self
    }

    /// Sets how long `close` waits for delivery workers to drain.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.cfg.grace = grace;
        self
    }

    /// Sets what happens to buffered messages on unsubscribe.
    pub fn with_pending_policy(mut self, pending: PendingPolicy) -> Self {
        self.cfg.pending = pending;
        self
    }

    /// Returns the configuration built so far.
    pub fn config(&self) -> &BusConfig {
        &self.cfg
    }

    /// Builds the bus and spawns its dispatch task.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn build<M>(self) -> Bus<M>
    where
        M: Send + Sync + 'static,
    {
        Bus::new(self.cfg)
    }
}
