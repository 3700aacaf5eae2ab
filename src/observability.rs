use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Orchestration counters, shared across runs
#[derive(Debug, Default)]
pub struct OrchestrationMetrics {
    pub runs_started: AtomicU64,
    pub approvals_failed: AtomicU64,
    pub approvals_without_project: AtomicU64,
    pub documents_generated: AtomicU64,
    pub generation_attempts: AtomicU64,
    pub generation_timeouts: AtomicU64,
    pub generation_exhausted: AtomicU64,
    pub runs_cancelled: AtomicU64,
}

impl OrchestrationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval_failed(&self) {
        self.approvals_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_without_project(&self) {
        self.approvals_without_project.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_document_generated(&self) {
        self.documents_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_attempts(&self, attempts: u32) {
        self.generation_attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
    }

    pub fn record_generation_timeout(&self) {
        self.generation_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_exhausted(&self) {
        self.generation_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_cancelled(&self) {
        self.runs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> OrchestrationStats {
        OrchestrationStats {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            approvals_failed: self.approvals_failed.load(Ordering::Relaxed),
            approvals_without_project: self.approvals_without_project.load(Ordering::Relaxed),
            documents_generated: self.documents_generated.load(Ordering::Relaxed),
            generation_attempts: self.generation_attempts.load(Ordering::Relaxed),
            generation_timeouts: self.generation_timeouts.load(Ordering::Relaxed),
            generation_exhausted: self.generation_exhausted.load(Ordering::Relaxed),
            runs_cancelled: self.runs_cancelled.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            runs = stats.runs_started,
            approvals_failed = stats.approvals_failed,
            without_project = stats.approvals_without_project,
            documents = stats.documents_generated,
            attempts = stats.generation_attempts,
            timeouts = stats.generation_timeouts,
            exhausted = stats.generation_exhausted,
            cancelled = stats.runs_cancelled,
            "Orchestration metrics"
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestrationStats {
    pub runs_started: u64,
    pub approvals_failed: u64,
    pub approvals_without_project: u64,
    pub documents_generated: u64,
    pub generation_attempts: u64,
    pub generation_timeouts: u64,
    pub generation_exhausted: u64,
    pub runs_cancelled: u64,
}

/// Time an operation and log its duration on finish
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = OrchestrationMetrics::new();
        metrics.record_run_started();
        metrics.record_run_started();
        metrics.record_generation_attempts(3);
        metrics.record_generation_timeout();
        metrics.record_generation_exhausted();

        let stats = metrics.get_stats();
        assert_eq!(stats.runs_started, 2);
        assert_eq!(stats.generation_attempts, 3);
        assert_eq!(stats.generation_timeouts, 1);
        assert_eq!(stats.generation_exhausted, 1);
        assert_eq!(stats.documents_generated, 0);
    }
}
