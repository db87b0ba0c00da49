#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fanbus::{Bus, Subscription};
use tokio::sync::{Notify, Semaphore};

/// Shared log of received messages.
#[derive(Clone)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, v: T) {
        self.seen.lock().unwrap().push(v);
    }

    pub fn seen(&self) -> Vec<T> {
        self.seen.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Waits until at least `n` messages arrived; panics after `limit`.
    pub async fn wait_len(&self, n: usize, limit: Duration) {
        let deadline = tokio::time::Instant::now() + limit;
        while self.len() < n {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {n} messages within {limit:?}, got {}",
                self.len()
            );
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

/// Subscribes a recorder that clones every message it gets.
pub async fn record<T>(bus: &Bus<T>, name: &str) -> (Recorder<T>, Subscription<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let rec = Recorder::new();
    let sink = rec.clone();
    let sub = bus
        .subscribe_fn(name, move |msg: Arc<T>| {
            let sink = sink.clone();
            async move { sink.push((*msg).clone()) }
        })
        .await;
    (rec, sub)
}

/// Blocks callbacks until opened; reports each callback that starts waiting.
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
    started: Arc<Notify>,
}

impl Gate {
    pub fn closed() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
            started: Arc::new(Notify::new()),
        }
    }

    pub async fn pass(&self) {
        self.started.notify_one();
        let permit = self.permits.acquire().await.unwrap();
        permit.forget();
    }

    pub async fn wait_started(&self) {
        tokio::time::timeout(Duration::from_secs(1), self.started.notified())
            .await
            .expect("callback should start");
    }

    pub fn open(&self) {
        self.permits.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

/// Subscribes a recorder whose callback waits on `gate` before recording.
pub async fn record_gated<T>(
    bus: &Bus<T>,
    name: &str,
    gate: &Gate,
) -> (Recorder<T>, Subscription<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let rec = Recorder::new();
    let sink = rec.clone();
    let gate = gate.clone();
    let sub = bus
        .subscribe_fn(name, move |msg: Arc<T>| {
            let sink = sink.clone();
            let gate = gate.clone();
            async move {
                gate.pass().await;
                sink.push((*msg).clone());
            }
        })
        .await;
    (rec, sub)
}
