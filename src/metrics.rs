use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing request activity.
#[derive(Default)]
pub struct ServiceMetrics {
    pdfs_uploaded: AtomicU64,
    questions_answered: AtomicU64,
    fallback_fetches: AtomicU64,
    summaries_generated: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a PDF that was stored remotely and persisted as a record.
    pub fn record_upload(&self) {
        self.pdfs_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered question and how many ladder candidates past the first were fetched.
    pub fn record_answer(&self, fallback_fetches: u64) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        self.fallback_fetches
            .fetch_add(fallback_fetches, Ordering::Relaxed);
    }

    /// Record a generated summary.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pdfs_uploaded: self.pdfs_uploaded.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            fallback_fetches: self.fallback_fetches.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of request counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of PDFs uploaded since startup.
    pub pdfs_uploaded: u64,
    /// Number of questions answered successfully.
    pub questions_answered: u64,
    /// Fetches beyond the stored URL that answered questions needed.
    pub fallback_fetches: u64,
    /// Number of summaries produced.
    pub summaries_generated: u64,
}
