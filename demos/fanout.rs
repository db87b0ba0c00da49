//! # Example: fanout
//!
//! One producer, three subscribers with different speeds:
//! - `LogWriter` logs every message through `tracing`.
//! - `fast` sums payloads.
//! - `slow` sleeps per message and falls behind without slowing the others,
//!   until its queue fills and `publish_timeout` starts reporting backpressure.
//!
//! ```text
//! producer ──publish_timeout──► Bus ──► [log]  ──► LogWriter
//!                                   ├──► [fast] ──► sum
//!                                   └──► [slow] ──► sleep 20ms
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example fanout --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use fanbus::{Bus, LogWriter};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Tick(u64);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bus: Bus<Tick> = Bus::<Tick>::builder()
        .with_inbound_capacity(8)
        .with_subscriber_capacity(4)
        .with_grace(Duration::from_secs(2))
        .build();

    let log = Arc::new(LogWriter::new());
    bus.subscribe(log.clone()).await;

    let sum = Arc::new(AtomicU64::new(0));
    let fast_sum = Arc::clone(&sum);
    bus.subscribe_fn("fast", move |tick: Arc<Tick>| {
        let sum = Arc::clone(&fast_sum);
        async move {
            sum.fetch_add(tick.0, Ordering::Relaxed);
        }
    })
    .await;

    let slow = bus
        .subscribe_fn("slow", |tick: Arc<Tick>| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tracing::info!(tick = tick.0, "slow subscriber caught up");
        })
        .await;

    let mut refused = 0;
    for i in 1..=40 {
        if !bus.publish_timeout(Tick(i), Duration::from_millis(5)).await {
            refused += 1;
        }
    }
    tracing::info!(refused, "producer done");

    slow.unsubscribe().await;
    bus.publish(Tick(1000)).await;

    bus.close().await?;
    let stats = bus.stats();
    println!();
    println!("Stats:");
    println!(" ├─► Published: {}", stats.published);
    println!(" ├─► Refused:   {}", stats.rejected);
    println!(" ├─► Delivered: {}", stats.delivered);
    println!(" ├─► Logged:    {}", log.seen());
    println!(" └─► Fast sum:  {}", sum.load(Ordering::Relaxed));
    Ok(())
}
