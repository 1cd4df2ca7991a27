use thiserror::Error;

use crate::external::InferenceError;

/// Errors raised while setting up or running Stage-2 enrichment.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("backend returned {got} results for {expected} jobs")]
    LengthMismatch { expected: usize, got: usize },

    #[error("enrichment task failed: {reason}")]
    TaskFailed { reason: String },
}

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;
