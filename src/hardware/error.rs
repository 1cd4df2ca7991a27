use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("hardware probe failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("accelerator present but unhealthy: {reason}")]
    AcceleratorUnhealthy { reason: String },
}
