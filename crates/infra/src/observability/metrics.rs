//! Per-client request counters
//!
//! Counters are monotonic and only ever read for log fields and
//! diagnostics, so relaxed ordering is enough.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts of calls made through one API client
#[derive(Debug, Default)]
pub struct RequestMetrics {
    sent: AtomicU64,
    failed: AtomicU64,
    batched: AtomicU64,
}

/// Point-in-time copy of [`RequestMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests handed to the HTTP client
    pub sent: u64,
    /// Requests that ended in an error
    pub failed: u64,
    /// Calls recorded into a batch instead of sent
    pub batched: u64,
}

impl RequestMetrics {
    /// All counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request sent; returns its 1-based sequence number
    pub fn record_sent(&self) -> u64 {
        self.sent.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a request that ended in an error
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call diverted into a batch
    pub fn record_batched(&self) {
        self.batched.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            batched: self.batched.load(Ordering::Relaxed),
        }
    }
}
