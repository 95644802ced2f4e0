//! Bounded fire-and-forget analytics delivery.
//!
//! Enqueueing never waits: a full queue drops the event and bumps a counter.
//! Each event is delivered on its own task under a timeout, so a slow or
//! panicking sink only affects that event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tipbot_core::{AnalyticsEvent, AnalyticsSink};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsQueueConfig {
    pub capacity: usize,
    pub timeout_ms: u64,
}

impl Default for AnalyticsQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Snapshot of the delivery counters.
pub struct AnalyticsQueueStats {
    pub enqueued: u64,
    pub dropped_full: u64,
    pub dropped_closed: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub panicked: u64,
}

impl AnalyticsQueueStats {
    /// Events that left the queue one way or another.
    pub fn settled(&self) -> u64 {
        self.completed + self.failed + self.timed_out + self.panicked
    }
}

#[derive(Debug, Default)]
struct AnalyticsQueueCounters {
    enqueued: AtomicU64,
    dropped_full: AtomicU64,
    dropped_closed: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    panicked: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct AnalyticsQueue {
    sender: mpsc::Sender<AnalyticsEvent>,
    counters: Arc<AnalyticsQueueCounters>,
}

impl AnalyticsQueue {
    /// Starts the delivery worker on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn AnalyticsSink>, config: AnalyticsQueueConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let counters = Arc::new(AnalyticsQueueCounters::default());
        let timeout = Duration::from_millis(config.timeout_ms.max(1));
        tokio::spawn(run_analytics_worker(
            receiver,
            sink,
            timeout,
            Arc::clone(&counters),
        ));
        Self { sender, counters }
    }

    /// Queues `event` without waiting. Returns false when it was dropped.
    pub fn enqueue(&self, event: AnalyticsEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.counters.dropped_full.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(event = %event.name, "analytics queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.counters
                    .dropped_closed
                    .fetch_add(1, Ordering::Relaxed);
                tracing::debug!(event = %event.name, "analytics worker gone, dropping event");
                false
            }
        }
    }

    pub fn stats(&self) -> AnalyticsQueueStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        AnalyticsQueueStats {
            enqueued: load(&self.counters.enqueued),
            dropped_full: load(&self.counters.dropped_full),
            dropped_closed: load(&self.counters.dropped_closed),
            completed: load(&self.counters.completed),
            failed: load(&self.counters.failed),
            timed_out: load(&self.counters.timed_out),
            panicked: load(&self.counters.panicked),
        }
    }
}

async fn run_analytics_worker(
    mut receiver: mpsc::Receiver<AnalyticsEvent>,
    sink: Arc<dyn AnalyticsSink>,
    timeout: Duration,
    counters: Arc<AnalyticsQueueCounters>,
) {
    while let Some(event) = receiver.recv().await {
        let name = event.name.clone();
        let sink = Arc::clone(&sink);
        let delivery =
            tokio::spawn(async move { tokio::time::timeout(timeout, sink.track(event)).await });
        let counter = match delivery.await {
            Ok(Ok(Ok(()))) => &counters.completed,
            Ok(Ok(Err(error))) => {
                tracing::debug!(event = %name, %error, "analytics delivery failed");
                &counters.failed
            }
            Ok(Err(_elapsed)) => {
                tracing::debug!(event = %name, "analytics delivery timed out");
                &counters.timed_out
            }
            Err(error) => {
                tracing::warn!(event = %name, %error, "analytics delivery task aborted");
                &counters.panicked
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
