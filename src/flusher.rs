//! Periodic drain of the queue in immediate mode.
//!
//! Writes tend to arrive in bursts (an editor saving, a formatter running).
//! Draining on a fixed interval instead of per event collapses a burst into
//! one reload per key per interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::queue::ReloadQueue;

/// Drains a [`ReloadQueue`] every `period`.
pub struct DebounceFlusher {
    queue: Arc<ReloadQueue>,
    period: Duration,
    span: Span,
}

impl DebounceFlusher {
    pub fn new(queue: Arc<ReloadQueue>, period: Duration, span: Span) -> Self {
        Self {
            queue,
            period,
            span,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Commands run on the blocking pool and each drain finishes before the
    /// next tick is considered, so drains never overlap.
    pub async fn run(self, cancel: CancellationToken) {
        let span = self.span.clone();
        async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            crate::debug_event!("flusher", "started", "every {}ms", self.period.as_millis());

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        crate::debug_event!("flusher", "stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.drain().await;
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn drain(&self) {
        if self.queue.is_empty() {
            return;
        }

        let queue = self.queue.clone();
        match tokio::task::spawn_blocking(move || queue.execute_all()).await {
            Ok(ran) => {
                crate::debug_event!("flusher", "drained", "{}", ran.join(", "));
            }
            Err(e) => {
                tracing::error!("[flusher] drain task failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<String>>,
    }

    impl Executor for RecordingExecutor {
        fn execute(&self, key: &str) {
            self.calls.lock().push(key.to_string());
        }
    }

    #[tokio::test]
    async fn test_burst_collapses_into_one_execution() {
        let executor = Arc::new(RecordingExecutor::default());
        let queue = Arc::new(ReloadQueue::new(executor.clone()));

        // A burst of writes before the first drain
        for _ in 0..5 {
            queue.enqueue("a");
        }
        queue.enqueue("b");

        let cancel = CancellationToken::new();
        let flusher = DebounceFlusher::new(queue.clone(), Duration::from_millis(20), Span::none());
        let handle = tokio::spawn(flusher.run(cancel.clone()));

        for _ in 0..100 {
            if queue.is_empty() && executor.calls.lock().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        handle.await.unwrap();

        assert!(queue.is_empty());
        assert_eq!(
            *executor.calls.lock(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(RecordingExecutor::default())));
        let cancel = CancellationToken::new();
        let flusher = DebounceFlusher::new(queue, Duration::from_secs(60), Span::none());
        let handle = tokio::spawn(flusher.run(cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("flusher did not stop")
            .unwrap();
    }
}
