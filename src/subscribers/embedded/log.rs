//! # LogWriter: message logger
//!
//! A minimal subscriber that logs every message it receives through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO fanbus: message subscriber="log" seq=1 msg=Tick(1)
//! INFO fanbus: message subscriber="log" seq=2 msg=Tick(2)
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::subscribers::Subscribe;

/// Message logger subscriber.
#[derive(Debug, Default)]
pub struct LogWriter {
    seen: AtomicU64,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many messages were logged so far.
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<M> Subscribe<M> for LogWriter
where
    M: Debug + Send + Sync + 'static,
{
    async fn on_message(&self, msg: Arc<M>) {
        let seq = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(target: "fanbus", subscriber = "log", seq, msg = ?msg, "message");
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_logged_messages() {
        let log = LogWriter::new();
        for i in 0..3u32 {
            log.on_message(Arc::new(i)).await;
        }
        assert_eq!(log.seen(), 3);
        assert_eq!(Subscribe::<u32>::name(&log), "log");
    }
}
