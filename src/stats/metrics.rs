//! Statistics and metrics for offload dispatch

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of service-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffloadStats {
    /// Cards bound through the connect hook
    pub connects: u64,
    /// Cards released through the disconnect hook
    pub disconnects: u64,
    /// Suspend notifications seen
    pub suspends: u64,
    /// Lifecycle events dropped for an out-of-range card index
    pub dropped_events: u64,
    /// Offload configuration requests received
    pub requests: u64,
    /// Requests that completed successfully
    pub applied: u64,
    /// Requests that returned an error
    pub failed: u64,
    /// Handler calls made
    pub handler_invocations: u64,
    /// Successful requests with no handler registered
    pub skipped_no_handler: u64,
    /// Time since the collector was created
    pub uptime: Duration,
}

impl OffloadStats {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of requests that failed (0.0 with no requests)
    pub fn failure_rate(&self) -> f64 {
        if self.requests > 0 {
            self.failed as f64 / self.requests as f64
        } else {
            0.0
        }
    }
}

/// Lock-free counters shared by the service components
#[derive(Debug)]
pub struct StatsCollector {
    started_at: Instant,
    connects: AtomicU64,
    disconnects: AtomicU64,
    suspends: AtomicU64,
    dropped_events: AtomicU64,
    requests: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
    handler_invocations: AtomicU64,
    skipped_no_handler: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            connects: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
            suspends: AtomicU64::new(0),
            dropped_events: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            handler_invocations: AtomicU64::new(0),
            skipped_no_handler: AtomicU64::new(0),
        }
    }

    pub fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suspend(&self) {
        self.suspends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_event(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished request and whether the handler ran
    pub fn record_applied(&self, invoked: bool) {
        self.applied.fetch_add(1, Ordering::Relaxed);
        if invoked {
            self.handler_invocations.fetch_add(1, Ordering::Relaxed);
        } else {
            self.skipped_no_handler.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters
    pub fn snapshot(&self) -> OffloadStats {
        OffloadStats {
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            suspends: self.suspends.load(Ordering::Relaxed),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            handler_invocations: self.handler_invocations.load(Ordering::Relaxed),
            skipped_no_handler: self.skipped_no_handler.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
