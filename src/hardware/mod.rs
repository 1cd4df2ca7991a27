//! Hardware advisor: probes compute once and recommends batch size, timeout and tier.

mod advisor;
mod error;
mod probe;
mod types;


pub use advisor::{HardwareAdvisor, classify};
pub use error::HardwareError;
pub use probe::{DeviceProbe, ProbeReport, StaticProbe, SystemProbe};
pub use types::{DeviceKind, HardwareConfig, PerformanceTier};
