//! # Subscription handles.
//!
//! [`Subscription`] is what [`Bus::subscribe`](crate::Bus::subscribe) hands back. It carries
//! the subscription's id and state, never the queue or the callback.
//!
//! ## State machine
//! ```text
//! Active ──unsubscribe()──► Unsubscribed   (terminal)
//!    └─────Bus::close()───────┘
//! ```
//!
//! Dropping the handle does **not** unsubscribe; the subscription stays attached until
//! `unsubscribe` or `Bus::close`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use crate::core::Registry;

/// Identity of a subscription; unique and never reused within one bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw sequence number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// State shared by the registry entry, the delivery worker and the caller's handle.
#[derive(Debug)]
pub(crate) struct SubscriptionState {
    pub(crate) id: SubscriptionId,
    pub(crate) name: String,
    /// Publish sequence at registration; messages stamped at or below it predate the subscription.
    pub(crate) start_seq: u64,
    active: AtomicBool,
    /// Fires on unsubscribe with `PendingPolicy::Drop`; the worker stops without draining.
    pub(crate) cancel: CancellationToken,
}

impl SubscriptionState {
    pub(crate) fn new(id: SubscriptionId, name: String, start_seq: u64, active: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            name,
            start_seq,
            active: AtomicBool::new(active),
            cancel: CancellationToken::new(),
        })
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Caller-side handle of one subscription.
pub struct Subscription<M>
where
    M: Send + Sync + 'static,
{
    state: Arc<SubscriptionState>,
    registry: Weak<Registry<M>>,
}

impl<M> Subscription<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) fn new(state: Arc<SubscriptionState>, registry: Weak<Registry<M>>) -> Self {
        Self { state, registry }
    }

    /// Returns the subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.state.id
    }

    /// Returns the subscriber name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Returns `true` until the subscription is removed or its bus is closed.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Removes this subscription from its bus.
    ///
    /// Idempotent: later calls (or calls after `Bus::close`) do nothing.
    /// With the default [`PendingPolicy::Drop`](crate::PendingPolicy::Drop), buffered messages
    /// are discarded. Once this returns, at most one invocation that the delivery worker
    /// was already handing over may still start; an invocation that is already running
    /// is allowed to finish.
    ///
    /// Safe to call from inside the subscriber's own callback.
    pub async fn unsubscribe(&self) {
        match self.registry.upgrade() {
            Some(registry) => {
                registry.remove(self.state.id).await;
            }
            None => self.state.deactivate(),
        }
    }
}

impl<M> fmt::Debug for Subscription<M>
where
    M: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.state.id)
            .field("name", &self.state.name)
            .field("active", &self.state.is_active())
            .finish()
    }
}
