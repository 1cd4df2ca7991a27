use sysinfo::System;
use tracing::debug;

use super::error::HardwareError;
use crate::embedding::device::{device_label, is_accelerated, select_device};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// What a probe found.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Healthy accelerator, if any: `(name, memory_gb)`.
    pub accelerator: Option<(String, f64)>,
    pub cpu_cores: usize,
    pub available_memory_gb: f64,
}

/// Source of raw hardware facts.
pub trait DeviceProbe: Send + Sync {
    fn probe(&self) -> Result<ProbeReport, HardwareError>;
}

/// Probes the running machine: candle device selection, sysinfo memory, NVML under `cuda`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl SystemProbe {
    fn accelerator(&self, sys: &System) -> Result<Option<(String, f64)>, HardwareError> {
        let device = select_device();
        if !is_accelerated(&device) {
            return Ok(None);
        }

        // A device that cannot allocate a scalar is not usable.
        candle_core::Tensor::zeros(1, candle_core::DType::F32, &device).map_err(|e| {
            HardwareError::AcceleratorUnhealthy {
                reason: e.to_string(),
            }
        })?;

        let name = device_label(&device).to_string();
        let memory_gb = if device.is_cuda() {
            cuda_memory_gb()?
        } else {
            // Unified memory: the GPU may use roughly three quarters of system RAM.
            sys.total_memory() as f64 / BYTES_PER_GB * 0.75
        };

        Ok(Some((name, memory_gb)))
    }
}

impl DeviceProbe for SystemProbe {
    fn probe(&self) -> Result<ProbeReport, HardwareError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let cpu_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .map_err(|e| HardwareError::ProbeFailed {
                reason: format!("cannot read core count: {e}"),
            })?;
        let available_memory_gb = sys.available_memory() as f64 / BYTES_PER_GB;

        let accelerator = self.accelerator(&sys)?;
        debug!(
            cpu_cores,
            available_memory_gb,
            accelerator = ?accelerator,
            "Hardware probe finished"
        );

        Ok(ProbeReport {
            accelerator,
            cpu_cores,
            available_memory_gb,
        })
    }
}

#[cfg(feature = "cuda")]
fn cuda_memory_gb() -> Result<f64, HardwareError> {
    use nvml_wrapper::Nvml;

    let nvml = Nvml::init().map_err(|e| HardwareError::AcceleratorUnhealthy {
        reason: format!("NVML init failed: {e}"),
    })?;
    let device = nvml
        .device_by_index(0)
        .map_err(|e| HardwareError::AcceleratorUnhealthy {
            reason: format!("NVML device 0 unavailable: {e}"),
        })?;
    let memory = device
        .memory_info()
        .map_err(|e| HardwareError::AcceleratorUnhealthy {
            reason: format!("NVML memory query failed: {e}"),
        })?;

    Ok(memory.total as f64 / BYTES_PER_GB)
}

#[cfg(not(feature = "cuda"))]
fn cuda_memory_gb() -> Result<f64, HardwareError> {
    Err(HardwareError::ProbeFailed {
        reason: "CUDA memory query requires the `cuda` feature".to_string(),
    })
}

/// Probe returning a fixed report (or error); for embedding callers that already know
/// their hardware, and for tests.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    report: Option<ProbeReport>,
}

impl StaticProbe {
    pub fn new(report: ProbeReport) -> Self {
        Self {
            report: Some(report),
        }
    }

    /// A probe that always fails.
    pub fn failing() -> Self {
        Self { report: None }
    }
}

impl DeviceProbe for StaticProbe {
    fn probe(&self) -> Result<ProbeReport, HardwareError> {
        self.report.clone().ok_or_else(|| HardwareError::ProbeFailed {
            reason: "static probe configured to fail".to_string(),
        })
    }
}
