use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counters for a run (or a sequence of runs until [`reset`](Self::reset)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub runs: u64,
    pub total_jobs: usize,
    pub processed_jobs: usize,
    pub failed_jobs: usize,
    pub stage1_passed: usize,
    pub stage2_enriched: usize,
    /// Stage-2 results that came from the rule-based fallback.
    pub fallback_jobs: usize,
    /// Process-pool groups lost to a crashed worker.
    pub failed_groups: usize,
    pub elapsed: Duration,
    /// Processed jobs per second over `elapsed`.
    pub throughput: f64,
}

impl ProcessingStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds one run's elapsed time and recomputes throughput.
    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.elapsed += elapsed;
        let secs = self.elapsed.as_secs_f64();
        self.throughput = if secs > 0.0 {
            self.processed_jobs as f64 / secs
        } else {
            0.0
        };
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.runs += other.runs;
        self.total_jobs += other.total_jobs;
        self.processed_jobs += other.processed_jobs;
        self.failed_jobs += other.failed_jobs;
        self.stage1_passed += other.stage1_passed;
        self.stage2_enriched += other.stage2_enriched;
        self.fallback_jobs += other.fallback_jobs;
        self.failed_groups += other.failed_groups;
        self.record_elapsed(other.elapsed);
    }
}
