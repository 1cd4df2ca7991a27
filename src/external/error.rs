use thiserror::Error;

/// Failure of the structured-data extractor for one job.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("extraction failed: {reason}")]
    Failed { reason: String },

    #[error("extractor panicked: {reason}")]
    Panicked { reason: String },
}

/// Failure of the inference client.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("inference failed: {reason}")]
    Failed { reason: String },

    #[error("invalid inference response: {reason}")]
    InvalidResponse { reason: String },

    #[error("inference timed out after {seconds:.1}s")]
    Timeout { seconds: f64 },
}

/// Failure of the persistent job store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("bulk write failed: {reason}")]
    WriteFailed { reason: String },
}
