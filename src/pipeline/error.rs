use thiserror::Error;

use crate::stage1::FilterError;

/// Construction-time failures. A built orchestrator never returns an error from `process`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("invalid pipeline configuration: {reason}")]
    InvalidConfig { reason: String },
}
