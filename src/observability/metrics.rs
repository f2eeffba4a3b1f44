//! Compute counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Atomic, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for batch computation
#[derive(Debug, Default)]
pub struct ComputeMetrics {
    /// Batches that ran (possibly with failed rows)
    batches_computed: AtomicU64,
    /// Batches refused for an unknown predicate
    batches_rejected: AtomicU64,
    /// Rows that produced a result
    rows_computed: AtomicU64,
    /// Rows dropped after a callback failure
    rows_failed: AtomicU64,
}

impl ComputeMetrics {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished batch
    pub fn record_batch(&self, rows_computed: u64, rows_failed: u64) {
        self.batches_computed.fetch_add(1, Ordering::Relaxed);
        self.rows_computed.fetch_add(rows_computed, Ordering::Relaxed);
        self.rows_failed.fetch_add(rows_failed, Ordering::Relaxed);
    }

    /// Increment batches rejected
    pub fn increment_batches_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_computed: self.batches_computed.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            rows_computed: self.rows_computed.load(Ordering::Relaxed),
            rows_failed: self.rows_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches_computed: u64,
    pub batches_rejected: u64,
    pub rows_computed: u64,
    pub rows_failed: u64,
}
