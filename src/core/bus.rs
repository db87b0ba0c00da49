//! # Bus: producers, dispatch task and per-subscriber delivery workers.
//!
//! [`Bus`] owns the inbound queue, the subscription [`Registry`], and the dispatch task.
//! Producers call [`publish`](Bus::publish) / [`publish_timeout`](Bus::publish_timeout);
//! consumers call [`subscribe`](Bus::subscribe) and keep the returned [`Subscription`].
//!
//! ## Architecture
//! ```text
//! publish(msg) ──► [inbound queue] ──► dispatch task ──► snapshot (read lock)
//!  (waits when full)    (bounded)                           │
//!                                         ┌─────────────────┼─────────────────┐
//!                                         ▼                 ▼                 ▼
//!                                    [queue S1]        [queue S2]        [queue SN]
//!                                         │                 │                 │
//!                                     worker S1         worker S2         worker SN
//!                                         ▼                 ▼                 ▼
//!                                   on_message()      on_message()      on_message()
//! ```
//!
//! ## Close
//! ```text
//! close()
//!   ├─► closed = true                 (publish becomes a no-op)
//!   ├─► runtime_token.cancel()        (dispatch task exits; inbound leftovers dropped)
//!   ├─► registry.close()              (every subscription Unsubscribed, queues closed)
//!   └─► await workers (removed ones still running included) within grace:
//!          ├─ all drained  → Ok(())
//!          └─ timeout      → Err(BusError::GraceExceeded { stuck })
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::dispatch::{self, Envelope};
use crate::core::{BusBuilder, BusConfig, BusStats, Counters, Registry};
use crate::error::{BusError, PublishError};
use crate::subscribers::{Subscribe, SubscriberFn, Subscription, SubscriptionId};

/// In-process publish/subscribe bus with one delivery worker per subscriber.
///
/// ### Properties
/// - **Bounded**: inbound queue and every subscriber queue have fixed capacities.
/// - **Per-subscriber FIFO**: each subscriber sees messages in publish order.
/// - **Isolation**: a slow or panicking callback only delays its own queue.
/// - **Snapshot delivery**: a message goes to the subscriptions active when it is fanned out.
///
/// `M` is never cloned: each message is wrapped in one `Arc<M>` shared by all subscribers.
pub struct Bus<M>
where
    M: Send + Sync + 'static,
{
    cfg: BusConfig,
    tx: mpsc::Sender<Envelope<M>>,
    registry: Arc<Registry<M>>,
    counters: Arc<Counters>,
    runtime_token: CancellationToken,
    closed: AtomicBool,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl<M> Bus<M>
where
    M: Send + Sync + 'static,
{
    /// Creates a bus and spawns its dispatch task.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn new(cfg: BusConfig) -> Self {
        let (tx, rx) = mpsc::channel(cfg.inbound_capacity_clamped());
        let counters = Arc::new(Counters::default());
        let registry = Registry::new(&cfg, Arc::clone(&counters));
        let runtime_token = CancellationToken::new();

        let handle = tokio::spawn(dispatch::run(
            rx,
            Arc::clone(&registry),
            runtime_token.clone(),
        ));
        tracing::debug!(
            inbound_capacity = cfg.inbound_capacity_clamped(),
            subscriber_capacity = cfg.subscriber_capacity_clamped(),
            "bus started"
        );

        Self {
            cfg,
            tx,
            registry,
            counters,
            runtime_token,
            closed: AtomicBool::new(false),
            dispatch: Mutex::new(Some(handle)),
        }
    }

    /// Creates a bus whose inbound and subscriber queues all hold `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(BusConfig::with_capacity(capacity))
    }

    /// Returns a builder starting from [`BusConfig::default`].
    pub fn builder() -> BusBuilder {
        BusBuilder::new(BusConfig::default())
    }

    /// Publishes a message, waiting for room in the inbound queue.
    ///
    /// Never fails; after [`close`](Self::close) the message is silently discarded.
    pub async fn publish(&self, msg: M) {
        if self.is_closed() {
            self.counters.dropped_after_close();
            return;
        }
        match self.tx.send(self.envelope(msg)).await {
            Ok(()) => self.counters.published(),
            Err(_) => self.counters.dropped_after_close(),
        }
    }

    /// Publishes a message, giving up after `timeout`.
    ///
    /// Returns `true` if the message was enqueued. On `false` nothing was enqueued,
    /// either because the inbound queue stayed full or because the bus is closed.
    pub async fn publish_timeout(&self, msg: M, timeout: Duration) -> bool {
        if self.is_closed() {
            self.counters.dropped_after_close();
            return false;
        }
        match self.tx.send_timeout(self.envelope(msg), timeout).await {
            Ok(()) => {
                self.counters.published();
                true
            }
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => {
                self.counters.rejected();
                tracing::trace!(?timeout, "publish timed out; inbound queue full");
                false
            }
            Err(mpsc::error::SendTimeoutError::Closed(_)) => {
                self.counters.dropped_after_close();
                false
            }
        }
    }

    /// Publishes a message without waiting.
    pub fn try_publish(&self, msg: M) -> Result<(), PublishError> {
        if self.is_closed() {
            self.counters.dropped_after_close();
            return Err(PublishError::Closed);
        }
        match self.tx.try_send(self.envelope(msg)) {
            Ok(()) => {
                self.counters.published();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.counters.rejected();
                Err(PublishError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.counters.dropped_after_close();
                Err(PublishError::Closed)
            }
        }
    }

    /// Publishes from synchronous code, blocking the thread while the inbound queue is full.
    ///
    /// # Panics
    /// Panics if called from within an asynchronous execution context.
    pub fn publish_blocking(&self, msg: M) {
        if self.is_closed() {
            self.counters.dropped_after_close();
            return;
        }
        match self.tx.blocking_send(self.envelope(msg)) {
            Ok(()) => self.counters.published(),
            Err(_) => self.counters.dropped_after_close(),
        }
    }

    /// Registers a subscriber and starts its delivery worker.
    ///
    /// The subscriber receives messages fanned out after this call returns.
    /// On a closed bus the returned handle is already inactive.
    pub async fn subscribe(&self, sub: Arc<dyn Subscribe<M>>) -> Subscription<M> {
        self.registry.insert(sub).await
    }

    /// Registers a closure as a subscriber.
    ///
    /// Shorthand for `subscribe(SubscriberFn::arc(name, f))`.
    pub async fn subscribe_fn<F, Fut>(&self, name: &str, f: F) -> Subscription<M>
    where
        F: Fn(Arc<M>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.subscribe(SubscriberFn::<M, F>::arc(name.to_string(), f))
            .await
    }

    /// Removes a subscription by id; unknown ids are ignored.
    ///
    /// Returns `true` if a subscription was removed by this call.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.remove(id).await
    }

    /// Closes the bus.
    ///
    /// Stops the dispatch task, marks every subscription Unsubscribed and lets each
    /// delivery worker drain what is already in its queue. Waits up to
    /// [`BusConfig::grace`] for the workers, including those of subscriptions removed
    /// earlier that are still finishing; only the first call does any work.
    pub async fn close(&self) -> Result<(), BusError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::debug!("closing bus");

        self.runtime_token.cancel();
        if let Some(handle) = self.dispatch.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "dispatch task ended abnormally");
            }
        }

        let workers = self.registry.close().await;
        self.wait_workers(workers).await
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the number of active subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.registry.len().await
    }

    /// Returns a copy of the bus counters.
    pub fn stats(&self) -> BusStats {
        self.counters.snapshot()
    }

    /// Returns the configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.cfg
    }

    fn envelope(&self, msg: M) -> Envelope<M> {
        Envelope {
            seq: self.registry.stamp(),
            msg: Arc::new(msg),
        }
    }

    /// Awaits delivery workers within the grace period.
    async fn wait_workers(
        &self,
        mut workers: Vec<(String, JoinHandle<()>)>,
    ) -> Result<(), BusError> {
        let Some(grace) = self.cfg.grace_period() else {
            return Ok(());
        };

        let drained = join_all(workers.iter_mut().map(|(_, h)| h));
        if tokio::time::timeout(grace, drained).await.is_ok() {
            tracing::debug!("bus closed; all delivery workers drained");
            return Ok(());
        }

        let stuck: Vec<String> = workers
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(name, _)| name.clone())
            .collect();
        tracing::warn!(?grace, ?stuck, "delivery workers did not drain within grace");
        Err(BusError::GraceExceeded { grace, stuck })
    }
}

impl<M> std::fmt::Debug for Bus<M>
where
    M: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("cfg", &self.cfg)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
