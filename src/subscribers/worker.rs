//! # Per-subscription delivery worker.
//!
//! One tokio task per subscription, bound to it for its whole active lifetime:
//!
//! ```text
//! loop {
//!   ├─► cancel fired            → exit (buffered messages dropped)
//!   ├─► queue closed and empty  → exit (drained)
//!   └─► next message
//!         ├─ cancel fired meanwhile → exit
//!         └─ on_message(msg).catch_unwind()
//!               ├─ Ok    → delivered += 1
//!               └─ panic → panicked += 1, warn, continue
//! }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::Counters;
use crate::subscribers::{Subscribe, SubscriptionState};

/// Spawns the delivery worker for one subscription.
pub(crate) fn spawn<M>(
    sub: Arc<dyn Subscribe<M>>,
    state: Arc<SubscriptionState>,
    rx: mpsc::Receiver<Arc<M>>,
    counters: Arc<Counters>,
) -> JoinHandle<()>
where
    M: Send + Sync + 'static,
{
    tokio::spawn(run(sub, state, rx, counters))
}

async fn run<M>(
    sub: Arc<dyn Subscribe<M>>,
    state: Arc<SubscriptionState>,
    mut rx: mpsc::Receiver<Arc<M>>,
    counters: Arc<Counters>,
) where
    M: Send + Sync + 'static,
{
    loop {
        let msg = tokio::select! {
            biased;
            _ = state.cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(msg) => msg,
                None => break,
            },
        };
        // Unsubscribed between the dequeue and now.
        if state.cancel.is_cancelled() {
            break;
        }

        match AssertUnwindSafe(sub.on_message(msg)).catch_unwind().await {
            Ok(()) => counters.delivered(),
            Err(panic_err) => {
                counters.panicked();
                tracing::warn!(
                    subscriber = %state.name,
                    id = %state.id,
                    info = %panic_message(&*panic_err),
                    "subscriber panicked; continuing with next message"
                );
            }
        }
    }
    tracing::debug!(subscriber = %state.name, id = %state.id, "delivery worker exited");
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::{SubscriberFn, SubscriptionId};
    use std::sync::Mutex;
    use std::time::Duration;

    fn state(name: &str) -> Arc<SubscriptionState> {
        SubscriptionState::new(SubscriptionId::new(1), name.to_string(), 0, true)
    }

    #[tokio::test]
    async fn test_panic_does_not_stop_worker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_sub = Arc::clone(&seen);
        let sub = SubscriberFn::arc("flaky", move |msg: Arc<u32>| {
            let seen = Arc::clone(&seen_in_sub);
            async move {
                if *msg == 2 {
                    panic!("boom on {msg}");
                }
                seen.lock().unwrap().push(*msg);
            }
        });
        let counters = Arc::new(Counters::default());
        let (tx, rx) = mpsc::channel(8);
        let handle = spawn(sub, state("flaky"), rx, Arc::clone(&counters));

        for i in 1..=3 {
            tx.send(Arc::new(i)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
        let stats = counters.snapshot();
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.panicked, 1);
    }

    #[tokio::test]
    async fn test_cancel_drops_buffered_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_sub = Arc::clone(&seen);
        let sub = SubscriberFn::arc("sink", move |msg: Arc<u32>| {
            let seen = Arc::clone(&seen_in_sub);
            async move { seen.lock().unwrap().push(*msg) }
        });
        let st = state("sink");
        let (tx, rx) = mpsc::channel(8);
        st.cancel.cancel();
        for i in 0..4 {
            tx.send(Arc::new(i)).await.unwrap();
        }
        let handle = spawn(sub, st, rx, Arc::new(Counters::default()));

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should exit on cancel")
            .unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
