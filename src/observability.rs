//! Observability stubs (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    files_resolved: AtomicU64,
    links_generated: AtomicU64,
    upstream_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_resolved(&self) {
        self.files_resolved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "files_resolved", "Metric incremented");
    }

    pub fn link_generated(&self) {
        self.links_generated.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "links_generated", "Metric incremented");
    }

    pub fn upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "upstream_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_resolved: self.files_resolved.load(Ordering::Relaxed),
            links_generated: self.links_generated.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub files_resolved: u64,
    pub links_generated: u64,
    pub upstream_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.file_resolved();
        metrics.file_resolved();
        metrics.link_generated();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_resolved, 2);
        assert_eq!(snapshot.links_generated, 1);
        assert_eq!(snapshot.upstream_failures, 0);
    }
}
