//! # Bus configuration.
//!
//! Provides [`BusConfig`], the tunables shared by a bus and every subscription it creates.
//! A [`BusRegistry`](crate::BusRegistry) applies one config to all buses it creates.
//!
//! ## Sentinel values
//! - `subscriber_capacity = 0` → same as `inbound_capacity`
//! - `grace = 0s` → `close` does not wait for delivery workers

use std::time::Duration;

use crate::policies::PendingPolicy;

/// Configuration for a [`Bus`](crate::Bus).
///
/// ## Field semantics
/// - `inbound_capacity`: size of the producer-facing buffer (min 1)
/// - `subscriber_capacity`: size of each subscriber's private buffer (`0` = inbound size)
/// - `grace`: how long `close` waits for workers to drain (`0s` = don't wait)
/// - `pending`: fate of buffered messages on unsubscribe
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Capacity of the inbound queue between producers and the dispatch task.
    ///
    /// When full, `publish` waits, `publish_timeout` waits up to its timeout and
    /// `try_publish` fails with `PublishError::Full`.
    pub inbound_capacity: usize,

    /// Default capacity of each subscriber's private queue.
    ///
    /// A subscriber may override it via `Subscribe::queue_capacity`.
    pub subscriber_capacity: usize,

    /// Maximum time `close` waits for delivery workers to drain and exit.
    pub grace: Duration,

    /// What happens to buffered messages on unsubscribe.
    pub pending: PendingPolicy,
}

impl BusConfig {
    /// Creates a config whose inbound and subscriber capacities are both `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inbound_capacity: capacity,
            subscriber_capacity: capacity,
            ..Self::default()
        }
    }

    /// Returns the inbound capacity clamped to a minimum of 1.
    #[inline]
    pub fn inbound_capacity_clamped(&self) -> usize {
        self.inbound_capacity.max(1)
    }

    /// Returns the default subscriber capacity, resolving the `0` sentinel.
    #[inline]
    pub fn subscriber_capacity_clamped(&self) -> usize {
        match self.subscriber_capacity {
            0 => self.inbound_capacity_clamped(),
            n => n,
        }
    }

    /// Returns the close grace period as an `Option`.
    ///
    /// - `None` → don't wait for workers
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `inbound_capacity = 1000`
    /// - `subscriber_capacity = 0` (same as inbound)
    /// - `grace = 5s`
    /// - `pending = PendingPolicy::Drop`
    fn default() -> Self {
        Self {
            inbound_capacity: 1000,
            subscriber_capacity: 0,
            grace: Duration::from_secs(5),
            pending: PendingPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_capacity_defaults_to_inbound() {
        let cfg = BusConfig {
            inbound_capacity: 64,
            subscriber_capacity: 0,
            ..BusConfig::default()
        };
        assert_eq!(cfg.subscriber_capacity_clamped(), 64);

        let cfg = BusConfig {
            subscriber_capacity: 8,
            ..cfg
        };
        assert_eq!(cfg.subscriber_capacity_clamped(), 8);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = BusConfig::with_capacity(0);
        assert_eq!(cfg.inbound_capacity_clamped(), 1);
        assert_eq!(cfg.subscriber_capacity_clamped(), 1);
    }

    #[test]
    fn test_zero_grace_means_no_wait() {
        let cfg = BusConfig {
            grace: Duration::ZERO,
            ..BusConfig::default()
        };
        assert_eq!(cfg.grace_period(), None);
        assert_eq!(
            BusConfig::default().grace_period(),
            Some(Duration::from_secs(5))
        );
    }
}
