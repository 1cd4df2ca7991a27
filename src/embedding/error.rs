use std::path::PathBuf;
use thiserror::Error;

use crate::external::InferenceError;

/// Sentence-encoder failures, split by whether they happen while loading or per batch.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("invalid encoder configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("encoder file missing: {path}")]
    ModelNotFound { path: PathBuf },

    /// Weights or tokenizer could not be loaded.
    #[error("cannot load encoder {component}: {reason}")]
    Load {
        component: &'static str,
        reason: String,
    },

    /// Tokenizing or running one batch failed.
    #[error("encoding failed: {reason}")]
    Encode { reason: String },
}

impl EmbeddingError {
    /// Load-time errors make the backend unusable; encode errors only fail the batch.
    pub fn is_load_error(&self) -> bool {
        !matches!(self, EmbeddingError::Encode { .. })
    }
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::Encode {
            reason: err.to_string(),
        }
    }
}

impl From<EmbeddingError> for InferenceError {
    fn from(err: EmbeddingError) -> Self {
        let reason = err.to_string();
        if err.is_load_error() {
            InferenceError::Unavailable { reason }
        } else {
            InferenceError::Failed { reason }
        }
    }
}
