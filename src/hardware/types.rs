use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Accelerated,
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Low,
    Medium,
    High,
}

impl PerformanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Low => "low",
            PerformanceTier::Medium => "medium",
            PerformanceTier::High => "high",
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute profile detected at startup. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    pub device: DeviceKind,
    pub device_name: String,
    pub optimal_batch_size: usize,
    /// Accelerator memory for GPUs, available system memory for CPU profiles.
    pub max_memory_gb: f64,
    pub performance_tier: PerformanceTier,
    pub per_batch_timeout: Duration,
}

impl HardwareConfig {
    /// Profile for a healthy accelerator with `memory_gb` of device memory.
    pub fn accelerated(device_name: impl Into<String>, memory_gb: f64) -> Self {
        let (tier, batch, timeout) = if memory_gb >= 10.0 {
            (PerformanceTier::High, 32, 10)
        } else if memory_gb >= 6.0 {
            (PerformanceTier::Medium, 16, 15)
        } else {
            (PerformanceTier::Low, 8, 20)
        };

        Self {
            device: DeviceKind::Accelerated,
            device_name: device_name.into(),
            optimal_batch_size: batch,
            max_memory_gb: memory_gb,
            performance_tier: tier,
            per_batch_timeout: Duration::from_secs(timeout),
        }
    }

    /// CPU-only profile from core count and available memory.
    pub fn cpu(cores: usize, available_memory_gb: f64) -> Self {
        let (tier, batch, timeout) = if cores >= 16 && available_memory_gb >= 32.0 {
            (PerformanceTier::Medium, 8, 25)
        } else if cores >= 8 && available_memory_gb >= 16.0 {
            (PerformanceTier::Medium, 4, 35)
        } else {
            (PerformanceTier::Low, 2, 45)
        };

        Self {
            device: DeviceKind::Cpu,
            device_name: format!("cpu ({cores} cores)"),
            optimal_batch_size: batch,
            max_memory_gb: available_memory_gb,
            performance_tier: tier,
            per_batch_timeout: Duration::from_secs(timeout),
        }
    }

    /// Most conservative profile; used whenever probing fails.
    pub fn conservative() -> Self {
        Self {
            device: DeviceKind::Cpu,
            device_name: "cpu (unprobed)".to_string(),
            optimal_batch_size: 2,
            max_memory_gb: 0.0,
            performance_tier: PerformanceTier::Low,
            per_batch_timeout: Duration::from_secs(45),
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.device == DeviceKind::Accelerated
    }

    /// Expected Stage-2 throughput in jobs per second.
    pub fn estimated_throughput(&self) -> f64 {
        match (self.device, self.performance_tier) {
            (DeviceKind::Accelerated, PerformanceTier::High) => 25.0,
            (DeviceKind::Accelerated, PerformanceTier::Medium) => 12.0,
            (DeviceKind::Accelerated, PerformanceTier::Low) => 6.0,
            (DeviceKind::Cpu, PerformanceTier::Low) => 1.0,
            (DeviceKind::Cpu, _) => 3.0,
        }
    }

    /// Permits for the semaphore-gated individual Stage-2 path.
    pub fn stage2_concurrency(&self) -> usize {
        match self.performance_tier {
            PerformanceTier::Low => 1,
            PerformanceTier::Medium => 2,
            PerformanceTier::High => 4,
        }
    }
}
