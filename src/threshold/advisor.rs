use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hardware::{HardwareConfig, PerformanceTier};

/// Batches at or below this size always get Stage 2.
const SMALL_BATCH: usize = 10;
/// Low-tier hardware declines Stage 2 above this size.
const LOW_TIER_LIMIT: usize = 50;
/// Seconds of work Stage 2 may be sized for.
const CAPACITY_WINDOW_SECS: f64 = 60.0;
const TIMEOUT_MARGIN: f64 = 1.5;

const MIN_THRESHOLD: f64 = 0.1;
const MAX_THRESHOLD: f64 = 0.6;

/// `(min_jobs, threshold, admit_ratio)`, largest bucket first.
const BUCKETS: &[(usize, f64, f64)] = &[
    (200, 0.40, 0.15),
    (100, 0.30, 0.25),
    (50, 0.25, 0.40),
    (20, 0.20, 0.60),
    (0, 0.15, 0.80),
];

/// Caller preference between speed (1.0) and quality (0.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub speed_bias: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { speed_bias: 0.5 }
    }
}

impl Preferences {
    /// Clamps `speed_bias` into `[0, 1]`.
    pub fn new(speed_bias: f64) -> Self {
        Self {
            speed_bias: if speed_bias.is_nan() {
                0.5
            } else {
                speed_bias.clamp(0.0, 1.0)
            },
        }
    }

    pub fn favors_speed(&self) -> bool {
        self.speed_bias > 0.7
    }

    pub fn favors_quality(&self) -> bool {
        self.speed_bias < 0.3
    }
}

/// Stage-2 sizing for one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum Stage-1 score for Stage-2 admission.
    pub phase1_threshold: f64,
    pub phase2_batch_size: usize,
    pub quality_target: f64,
    /// Stage-2 admission cap.
    pub max_phase2_jobs: usize,
    /// Advisory Stage-2 budget.
    pub timeout_seconds: f64,
}

impl ThresholdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdAdvisor;

impl ThresholdAdvisor {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        job_count: usize,
        hardware: &HardwareConfig,
        preferences: &Preferences,
    ) -> ThresholdConfig {
        let (_, base_threshold, base_ratio) = BUCKETS
            .iter()
            .copied()
            .find(|(min_jobs, _, _)| job_count >= *min_jobs)
            .unwrap_or((0, 0.15, 0.80));

        let hardware_multiplier = match hardware.performance_tier {
            PerformanceTier::High => 0.85,
            PerformanceTier::Medium => 1.0,
            PerformanceTier::Low => 1.3,
        };

        let mut threshold = base_threshold * hardware_multiplier;
        let mut ratio = base_ratio;
        let mut quality_target = 0.8;
        if preferences.favors_speed() {
            threshold *= 1.2;
            ratio *= 0.8;
            quality_target = 0.7;
        } else if preferences.favors_quality() {
            threshold *= 0.8;
            ratio = (ratio * 1.2).min(1.0);
            quality_target = 0.9;
        }
        let threshold = threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);

        let throughput = hardware.estimated_throughput();
        let by_ratio = (job_count as f64 * ratio - 1e-9).ceil().max(0.0) as usize;
        let capacity = (throughput * CAPACITY_WINDOW_SECS) as usize;
        let max_phase2_jobs = by_ratio.min(capacity);
        let timeout_seconds = if throughput > 0.0 {
            max_phase2_jobs as f64 / throughput * TIMEOUT_MARGIN
        } else {
            0.0
        };

        let config = ThresholdConfig {
            phase1_threshold: threshold,
            phase2_batch_size: hardware.optimal_batch_size.max(1),
            quality_target,
            max_phase2_jobs,
            timeout_seconds,
        };

        debug!(
            job_count,
            tier = %hardware.performance_tier,
            threshold = config.phase1_threshold,
            max_phase2_jobs,
            timeout_seconds,
            "Threshold config calculated"
        );

        config
    }

    /// Whether Stage 2 should run for this batch at all.
    pub fn should_enable_stage2(
        &self,
        job_count: usize,
        hardware: &HardwareConfig,
        backend_available: bool,
    ) -> bool {
        if job_count <= SMALL_BATCH {
            return true;
        }
        if hardware.performance_tier == PerformanceTier::Low && job_count > LOW_TIER_LIMIT {
            return false;
        }
        backend_available
    }
}
