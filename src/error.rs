//! Error types used by the bus.
//!
//! This module defines two enums:
//!
//! - [`BusError`] errors raised while tearing a bus down.
//! - [`PublishError`] reasons a non-waiting publish was refused.
//!
//! Ordinary publishing never fails: [`Bus::publish`](crate::Bus::publish) waits for room
//! and [`Bus::publish_timeout`](crate::Bus::publish_timeout) reports backpressure as `false`.
//! Both types provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the bus runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// Delivery workers did not finish draining within the grace period after `close`.
    #[error("close grace {grace:?} exceeded; stuck subscribers: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the subscribers whose workers were still running.
        stuck: Vec<String>,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanbus::BusError;
    /// use std::time::Duration;
    ///
    /// let err = BusError::GraceExceeded { grace: Duration::from_secs(1), stuck: vec![] };
    /// assert_eq!(err.as_label(), "bus_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns the names of subscribers that were still busy, if any.
    pub fn stuck(&self) -> &[String] {
        match self {
            BusError::GraceExceeded { stuck, .. } => stuck,
        }
    }
}

/// Error returned by [`Bus::try_publish`](crate::Bus::try_publish).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Inbound queue is full (retry later or use `publish` / `publish_timeout`).
    #[error("inbound queue full")]
    Full,

    /// Bus was closed; the message was discarded.
    #[error("bus closed")]
    Closed,
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::Full => "publish_full",
            PublishError::Closed => "publish_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = BusError::GraceExceeded {
            grace: Duration::from_millis(10),
            stuck: vec!["slow".into()],
        };
        assert_eq!(err.as_label(), "bus_grace_exceeded");
        assert_eq!(err.stuck(), ["slow".to_string()]);
        assert_eq!(PublishError::Full.as_label(), "publish_full");
        assert_eq!(PublishError::Closed.as_label(), "publish_closed");
    }

    #[test]
    fn test_grace_exceeded_message_names_stuck_subscribers() {
        let err = BusError::GraceExceeded {
            grace: Duration::from_secs(2),
            stuck: vec!["audit".into(), "metrics".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2s"), "{msg}");
        assert!(msg.contains("audit") && msg.contains("metrics"), "{msg}");
    }
}
