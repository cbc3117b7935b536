//! Metrics collection for outbound mirror requests.
//!
//! Thread-safe counters for requests, failures, time spent waiting on
//! mirrors and bytes transferred. Nothing per-request is retained, so the
//! collector stays the same size however long the server runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FetchMetrics {
    total_bytes: AtomicU64,
    request_count: AtomicUsize,
    failure_count: AtomicUsize,
    /// Time until response headers arrived, summed (nanoseconds)
    total_request_time_ns: AtomicU64,
}

impl FetchMetrics {
    /// Create a new metrics collector wrapped in Arc for sharing
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, duration: Duration, succeeded: bool) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_request_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, bytes: u64) {
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_request_time(&self) -> Duration {
        Duration::from_nanos(self.total_request_time_ns.load(Ordering::Relaxed))
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} requests ({} failed), {} received, {:.2?} waiting on mirrors",
            self.request_count(),
            self.failure_count(),
            humansize::format_size(self.total_bytes(), humansize::BINARY),
            self.total_request_time()
        )
    }
}
