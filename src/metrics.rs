use crate::workflow::FinalStatus;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing audit activity.
#[derive(Default)]
pub struct AuditMetrics {
    audits_started: AtomicU64,
    audits_passed: AtomicU64,
    audits_failed: AtomicU64,
    audits_remediated: AtomicU64,
    audits_errored: AtomicU64,
}

impl AuditMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an audit entered the workflow.
    pub fn record_started(&self) {
        self.audits_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed audit and whether its content had to be redacted.
    pub fn record_completed(&self, status: FinalStatus, remediated: bool) {
        match status {
            FinalStatus::Pass => self.audits_passed.fetch_add(1, Ordering::Relaxed),
            FinalStatus::Fail | FinalStatus::Pending => {
                self.audits_failed.fetch_add(1, Ordering::Relaxed)
            }
        };
        if remediated {
            self.audits_remediated.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an audit aborted by a workflow error.
    pub fn record_error(&self) {
        self.audits_errored.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            audits_started: self.audits_started.load(Ordering::Relaxed),
            audits_passed: self.audits_passed.load(Ordering::Relaxed),
            audits_failed: self.audits_failed.load(Ordering::Relaxed),
            audits_remediated: self.audits_remediated.load(Ordering::Relaxed),
            audits_errored: self.audits_errored.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of audit counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Audits that entered the workflow since startup.
    pub audits_started: u64,
    /// Audits whose content passed the compliance check.
    pub audits_passed: u64,
    /// Audits whose content failed the compliance check.
    pub audits_failed: u64,
    /// Audits whose content was replaced by the redaction notice.
    pub audits_remediated: u64,
    /// Audits aborted by an index or workflow error.
    pub audits_errored: u64,
}
