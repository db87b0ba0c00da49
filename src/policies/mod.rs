//! Bus policies.
//!
//! ## Contents
//! - [`PendingPolicy`] what happens to buffered messages when a subscription is removed
//!
//! ## Defaults
//! - `PendingPolicy::Drop`: once `unsubscribe` returns, at most one invocation already
//!   being handed over still starts.

mod pending;

pub use pending::PendingPolicy;
