//! # Subscription registry.
//!
//! Ordered collection of active subscriptions plus the next-id counter, behind one
//! `tokio::sync::RwLock`:
//! - **read** lock: the dispatch task's per-message snapshot
//! - **write** lock: subscribe, unsubscribe, close
//!
//! ## Architecture
//! ```text
//! subscribe(sub) ──write──► seq += 1 ─► mpsc::channel(cap) ─► spawn worker ─► push Entry
//! unsubscribe(id) ─write──► remove Entry ─► deactivate ─► cancel (Drop) | close queue (Drain)
//! dispatch ────────read───► snapshot: Vec<Target> (queue sender + state), lock released
//! close() ────────write───► closed = true ─► take all entries ─► close every queue
//!                          └─► hand back live and retired worker handles
//! ```
//!
//! ## Rules
//! - Ids are allocated under the write lock; never reused for the registry's lifetime.
//! - The read lock is never held across a queue write, so a callback may unsubscribe
//!   itself while the dispatch task waits on its full queue.
//! - A target whose subscription is cancelled mid-offer abandons the write.
//! - A removed subscription's worker handle stays in `retired` until it finishes or the
//!   registry closes; `close` hands it back with the live ones so nothing outlives it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;

use crate::core::{BusConfig, Counters};
use crate::policies::PendingPolicy;
use crate::subscribers::{Subscribe, Subscription, SubscriptionId, SubscriptionState, worker};

/// Registry-owned part of one subscription.
struct Entry<M> {
    state: Arc<SubscriptionState>,
    sender: mpsc::Sender<Arc<M>>,
    worker: JoinHandle<()>,
}

/// A subscription as seen by one fan-out round.
pub(crate) struct Target<M> {
    state: Arc<SubscriptionState>,
    sender: mpsc::Sender<Arc<M>>,
}

impl<M> Target<M>
where
    M: Send + Sync + 'static,
{
    /// Returns `true` if a message stamped `seq` was published after this subscription started.
    pub(crate) fn accepts(&self, seq: u64) -> bool {
        seq > self.state.start_seq
    }

    /// Writes `msg` into this subscription's queue, waiting while it is full.
    ///
    /// Returns `false` if the subscription went away before the write completed.
    pub(crate) async fn offer(&self, msg: Arc<M>) -> bool {
        tokio::select! {
            biased;
            _ = self.state.cancel.cancelled() => false,
            sent = self.sender.send(msg) => sent.is_ok(),
        }
    }
}

struct Inner<M> {
    seq: u64,
    closed: bool,
    entries: Vec<Entry<M>>,
    /// Workers of removed subscriptions that may still be running.
    retired: Vec<(String, JoinHandle<()>)>,
}

/// Registry of active subscriptions.
pub(crate) struct Registry<M> {
    inner: RwLock<Inner<M>>,
    publish_seq: AtomicU64,
    default_capacity: usize,
    pending: PendingPolicy,
    counters: Arc<Counters>,
}

impl<M> Registry<M>
where
    M: Send + Sync + 'static,
{
    /// Creates a new registry.
    pub(crate) fn new(cfg: &BusConfig, counters: Arc<Counters>) -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(Inner {
                seq: 0,
                closed: false,
                entries: Vec::new(),
                retired: Vec::new(),
            }),
            publish_seq: AtomicU64::new(0),
            default_capacity: cfg.subscriber_capacity_clamped(),
            pending: cfg.pending,
            counters,
        })
    }

    /// Allocates the publish sequence number for a new message.
    pub(crate) fn stamp(&self) -> u64 {
        self.publish_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Registers `sub` and starts its delivery worker.
    ///
    /// After [`close`](Self::close) the returned handle is already inactive and no worker runs.
    pub(crate) async fn insert(self: &Arc<Self>, sub: Arc<dyn Subscribe<M>>) -> Subscription<M> {
        let name = sub.name().to_string();
        let capacity = sub
            .queue_capacity()
            .unwrap_or(self.default_capacity)
            .max(1);

        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let id = SubscriptionId::new(inner.seq);
        let start_seq = self.publish_seq.load(Ordering::SeqCst);

        if inner.closed {
            drop(inner);
            tracing::debug!(subscriber = %name, %id, "subscribe on closed bus ignored");
            let state = SubscriptionState::new(id, name, start_seq, false);
            return Subscription::new(state, Arc::downgrade(self));
        }

        let state = SubscriptionState::new(id, name, start_seq, true);
        let (sender, rx) = mpsc::channel(capacity);
        let worker = worker::spawn(sub, Arc::clone(&state), rx, Arc::clone(&self.counters));
        inner.entries.push(Entry {
            state: Arc::clone(&state),
            sender,
            worker,
        });
        drop(inner);

        tracing::debug!(subscriber = %state.name, %id, capacity, "subscribed");
        Subscription::new(state, Arc::downgrade(self))
    }

    /// Removes the subscription with `id`; unknown ids are ignored.
    ///
    /// Returns `true` if an active subscription was removed.
    pub(crate) async fn remove(&self, id: SubscriptionId) -> bool {
        let state = {
            let mut inner = self.inner.write().await;
            let Some(pos) = inner.entries.iter().position(|e| e.state.id == id) else {
                return false;
            };
            let Entry {
                state,
                sender,
                worker,
            } = inner.entries.remove(pos);

            state.deactivate();
            if self.pending == PendingPolicy::Drop {
                state.cancel.cancel();
            }
            // Closes the queue; the worker drains or stops, then exits.
            drop(sender);

            inner.retired.retain(|(_, h)| !h.is_finished());
            inner.retired.push((state.name.clone(), worker));
            state
        };

        tracing::debug!(
            subscriber = %state.name,
            %id,
            pending = self.pending.as_label(),
            "unsubscribed"
        );
        true
    }

    /// Returns the current fan-out targets. The read lock is released on return.
    pub(crate) async fn snapshot(&self) -> Vec<Target<M>> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .map(|e| Target {
                state: Arc::clone(&e.state),
                sender: e.sender.clone(),
            })
            .collect()
    }

    /// Returns the number of active subscriptions.
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Marks the registry closed and detaches every subscription.
    ///
    /// Each queue is closed so its worker drains what is already buffered and exits.
    /// Returns `(subscriber name, worker handle)` pairs for the caller to await, including
    /// workers of subscriptions removed earlier that have not finished yet.
    pub(crate) async fn close(&self) -> Vec<(String, JoinHandle<()>)> {
        let (entries, mut workers) = {
            let mut inner = self.inner.write().await;
            inner.closed = true;
            (
                std::mem::take(&mut inner.entries),
                std::mem::take(&mut inner.retired),
            )
        };

        workers.extend(entries.into_iter().map(|e| {
            e.state.deactivate();
            drop(e.sender);
            (e.state.name.clone(), e.worker)
        }));
        workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::SubscriberFn;

    fn noop() -> Arc<dyn Subscribe<u32>> {
        SubscriberFn::arc("noop", |_msg: Arc<u32>| async {})
    }

    fn registry() -> Arc<Registry<u32>> {
        Registry::new(&BusConfig::with_capacity(4), Arc::new(Counters::default()))
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_never_reused() {
        let reg = registry();
        let a = reg.insert(noop()).await;
        let b = reg.insert(noop()).await;
        assert!(reg.remove(b.id()).await);
        let c = reg.insert(noop()).await;

        assert_eq!(a.id().get(), 1);
        assert_eq!(b.id().get(), 2);
        assert_eq!(c.id().get(), 3);
        assert_eq!(reg.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let reg = registry();
        let sub = reg.insert(noop()).await;
        assert!(sub.is_active());

        assert!(reg.remove(sub.id()).await);
        assert!(!reg.remove(sub.id()).await);
        assert!(!reg.remove(SubscriptionId::new(99)).await);
        assert!(!sub.is_active());
        assert_eq!(reg.len().await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_membership() {
        let reg = registry();
        let a = reg.insert(noop()).await;
        let _b = reg.insert(noop()).await;
        assert_eq!(reg.snapshot().await.len(), 2);

        reg.remove(a.id()).await;
        let ids: Vec<_> = reg.snapshot().await.iter().map(|t| t.state.id).collect();
        assert_eq!(ids, vec![SubscriptionId::new(2)]);
    }

    #[tokio::test]
    async fn test_offer_to_removed_subscription_is_abandoned() {
        let reg = registry();
        let sub = reg.insert(noop()).await;
        let targets = reg.snapshot().await;
        reg.remove(sub.id()).await;

        assert!(!targets[0].offer(Arc::new(7)).await);
    }

    #[tokio::test]
    async fn test_close_returns_workers_of_removed_subscriptions() {
        let reg = registry();
        let gone = reg.insert(noop()).await;
        let _kept = reg.insert(noop()).await;
        assert!(reg.remove(gone.id()).await);

        let workers = reg.close().await;
        assert_eq!(workers.len(), 2);
        for (_, h) in workers {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_targets_skip_messages_stamped_before_subscribe() {
        let reg = registry();
        let early = reg.stamp();
        let _sub = reg.insert(noop()).await;
        let late = reg.stamp();

        let targets = reg.snapshot().await;
        assert!(!targets[0].accepts(early));
        assert!(targets[0].accepts(late));
    }

    #[tokio::test]
    async fn test_close_detaches_all_and_rejects_new() {
        let reg = registry();
        let a = reg.insert(noop()).await;
        let workers = reg.close().await;
        assert_eq!(workers.len(), 1);
        assert!(!a.is_active());
        for (_, h) in workers {
            h.await.unwrap();
        }

        let late = reg.insert(noop()).await;
        assert!(!late.is_active());
        assert_eq!(reg.len().await, 0);
    }
}
