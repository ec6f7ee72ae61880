//! Logger metrics for observability
//!
//! Counters for delivered, filtered and rejected messages, appender failures
//! and multi-part protocol violations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use gpa_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_delivered();
/// metrics.record_appender_failure();
///
/// assert_eq!(metrics.delivered(), 1);
/// assert_eq!(metrics.appender_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Caller fragments handed to the appenders. Closing fragments and
    /// diagnostics generated by the logger are not counted.
    delivered: AtomicU64,

    /// Calls rejected by the severity/module filter
    filtered: AtomicU64,

    /// Calls made after shutdown
    rejected_stopped: AtomicU64,

    /// Individual appender calls that returned an error or panicked
    appender_failures: AtomicU64,

    /// Out-of-sequence multi-part fragments
    protocol_violations: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            rejected_stopped: AtomicU64::new(0),
            appender_failures: AtomicU64::new(0),
            protocol_violations: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_stopped(&self) -> u64 {
        self.rejected_stopped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn appender_failures(&self) -> u64 {
        self.appender_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn protocol_violations(&self) -> u64 {
        self.protocol_violations.load(Ordering::Relaxed)
    }

    /// Record a delivered fragment
    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a filtered call
    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a call made after shutdown
    #[inline]
    pub fn record_rejected_stopped(&self) -> u64 {
        self.rejected_stopped.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed appender call
    #[inline]
    pub fn record_appender_failure(&self) -> u64 {
        self.appender_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a protocol violation
    #[inline]
    pub fn record_protocol_violation(&self) -> u64 {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.rejected_stopped.store(0, Ordering::Relaxed);
        self.appender_failures.store(0, Ordering::Relaxed);
        self.protocol_violations.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered()),
            filtered: AtomicU64::new(self.filtered()),
            rejected_stopped: AtomicU64::new(self.rejected_stopped()),
            appender_failures: AtomicU64::new(self.appender_failures()),
            protocol_violations: AtomicU64::new(self.protocol_violations()),
        }
    }
}
