//! # Dispatch task: inbound queue → per-subscriber queues.
//!
//! One task per bus, alive for the bus's lifetime:
//!
//! ```text
//! loop {
//!   ├─► runtime token cancelled → exit (messages left in the inbound queue are dropped)
//!   ├─► inbound closed (every Bus handle dropped) → detach subscriptions, exit
//!   └─► Envelope { seq, msg }
//!         ├─ targets = registry.snapshot()         (read lock, released right away)
//!         ├─ skip targets that started after `seq` was stamped
//!         └─ join_all(targets.offer(msg))           (each write waits on its own queue only)
//! }
//! ```
//!
//! The snapshot decides delivery eligibility: subscriptions added after it do not get
//! `msg`, subscriptions removed before it do not either. A subscription also never gets
//! a message whose publish call started before it subscribed. The next message is taken once
//! every target accepted (or abandoned) the current one; a saturated subscriber queue
//! therefore becomes backpressure on the inbound queue instead of unbounded buffering.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::Registry;

/// A published message with its publish sequence number.
pub(crate) struct Envelope<M> {
    pub(crate) seq: u64,
    pub(crate) msg: Arc<M>,
}

pub(crate) async fn run<M>(
    mut rx: mpsc::Receiver<Envelope<M>>,
    registry: Arc<Registry<M>>,
    runtime_token: CancellationToken,
) where
    M: Send + Sync + 'static,
{
    loop {
        let envelope = tokio::select! {
            biased;
            _ = runtime_token.cancelled() => break,
            next = rx.recv() => match next {
                Some(envelope) => envelope,
                None => {
                    // Dropped without close: let workers drain and go away on their own.
                    let detached = registry.close().await;
                    tracing::debug!(
                        subscribers = detached.len(),
                        "bus dropped; subscriptions detached"
                    );
                    break;
                }
            },
        };

        let Envelope { seq, msg } = envelope;
        let targets = registry.snapshot().await;
        if targets.is_empty() {
            tracing::trace!(seq, "no subscribers; message discarded");
            continue;
        }

        let fan_out = join_all(
            targets
                .iter()
                .filter(|t| t.accepts(seq))
                .map(|t| t.offer(Arc::clone(&msg))),
        );
        tokio::select! {
            biased;
            _ = runtime_token.cancelled() => break,
            _ = fan_out => {}
        }
    }
    tracing::debug!("dispatch task exited");
}
