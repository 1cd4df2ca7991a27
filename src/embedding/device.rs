use candle_core::Device;
use tracing::{debug, info, warn};

type Opener = fn() -> candle_core::Result<Device>;

/// Accelerator backends compiled into this build, in preference order.
fn accelerators() -> Vec<(&'static str, Opener)> {
    #[allow(unused_mut)]
    let mut table: Vec<(&'static str, Opener)> = Vec::new();
    #[cfg(feature = "metal")]
    table.push(("metal", || Device::new_metal(0)));
    #[cfg(feature = "cuda")]
    table.push(("cuda", || Device::new_cuda(0)));
    table
}

/// Opens the first accelerator that comes up, else the CPU. Never fails.
pub fn select_device() -> Device {
    let mut failures = Vec::new();

    for (label, open) in accelerators() {
        match open() {
            Ok(device) => {
                info!(device = label, "Accelerator selected");
                return device;
            }
            Err(e) => {
                warn!(device = label, error = %e, "Accelerator unavailable");
                failures.push(format!("{label}: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!("No accelerator backend compiled, using CPU");
    } else {
        warn!(failures = %failures.join("; "), "Falling back to CPU device");
    }
    Device::Cpu
}

/// Short label for logs and hardware reports.
pub fn device_label(device: &Device) -> &'static str {
    if device.is_cuda() {
        "cuda"
    } else if device.is_metal() {
        "metal"
    } else {
        "cpu"
    }
}

pub fn is_accelerated(device: &Device) -> bool {
    !device.is_cpu()
}
