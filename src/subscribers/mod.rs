//! # Subscribers and their delivery workers.
//!
//! This module provides the [`Subscribe`] trait, the closure adapter [`SubscriberFn`],
//! and the [`Subscription`] handle returned by [`Bus::subscribe`](crate::Bus::subscribe).
//!
//! ## Architecture
//! ```text
//! Bus::subscribe(sub) ──► Registry ──► spawn worker(sub, queue)
//!                                          │
//!                          dispatch ──► [queue] ──► sub.on_message(msg)   (one at a time)
//! ```

mod subscribe;
mod subscriber_fn;
mod subscription;
pub(crate) mod worker;

#[cfg(feature = "logging")]
mod embedded;

pub use subscribe::Subscribe;
pub use subscriber_fn::SubscriberFn;
pub use subscription::{Subscription, SubscriptionId};

pub(crate) use subscription::SubscriptionState;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
