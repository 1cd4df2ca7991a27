use parking_lot::RwLock;
use tracing::{info, warn};

use super::probe::{DeviceProbe, ProbeReport, SystemProbe};
use super::types::HardwareConfig;

/// Classifies a probe report. Never fails.
pub fn classify(report: &ProbeReport) -> HardwareConfig {
    match &report.accelerator {
        Some((name, memory_gb)) => HardwareConfig::accelerated(name.clone(), *memory_gb),
        None => HardwareConfig::cpu(report.cpu_cores, report.available_memory_gb),
    }
}

/// Probes compute once and caches the resulting [`HardwareConfig`].
pub struct HardwareAdvisor {
    probe: Box<dyn DeviceProbe>,
    cached: RwLock<Option<HardwareConfig>>,
}

impl std::fmt::Debug for HardwareAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareAdvisor")
            .field("cached", &*self.cached.read())
            .finish()
    }
}

impl Default for HardwareAdvisor {
    fn default() -> Self {
        Self::new(SystemProbe)
    }
}

impl HardwareAdvisor {
    pub fn new(probe: impl DeviceProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            cached: RwLock::new(None),
        }
    }

    /// Returns the cached profile, probing on first use.
    pub fn detect(&self) -> HardwareConfig {
        if let Some(config) = self.cached.read().as_ref() {
            return config.clone();
        }
        self.refresh()
    }

    /// Re-probes and replaces the cached profile.
    pub fn refresh(&self) -> HardwareConfig {
        let config = match self.probe.probe() {
            Ok(report) => classify(&report),
            Err(e) => {
                warn!(error = %e, "Hardware probe failed, using conservative CPU profile");
                HardwareConfig::conservative()
            }
        };

        info!(
            device = ?config.device,
            device_name = %config.device_name,
            tier = %config.performance_tier,
            batch_size = config.optimal_batch_size,
            per_batch_timeout_secs = config.per_batch_timeout.as_secs(),
            "Hardware profile detected"
        );

        *self.cached.write() = Some(config.clone());
        config
    }

    /// The cached profile without probing.
    pub fn current(&self) -> Option<HardwareConfig> {
        self.cached.read().clone()
    }
}
