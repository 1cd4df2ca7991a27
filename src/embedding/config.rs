use std::path::PathBuf;

use super::error::EmbeddingError;
use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN};

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer_path: PathBuf,
    /// Max tokens per text.
    pub max_seq_len: usize,
    /// Output dimension (stub mode only; a real model reports its own).
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            tokenizer_path: PathBuf::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    pub const ENV_MODEL_PATH: &'static str = "JOBSIFT_MODEL_PATH";
    pub const ENV_TOKENIZER_PATH: &'static str = "JOBSIFT_TOKENIZER_PATH";

    /// Loads config from environment variables (missing values become empty paths).
    pub fn from_env() -> Self {
        let model_dir = env_path(Self::ENV_MODEL_PATH).unwrap_or_default();
        let tokenizer_path = env_path(Self::ENV_TOKENIZER_PATH).unwrap_or_else(|| {
            if model_dir.as_os_str().is_empty() {
                PathBuf::new()
            } else {
                model_dir.join("tokenizer.json")
            }
        });

        Self {
            model_dir,
            tokenizer_path,
            ..Default::default()
        }
    }

    /// Config for a model directory with `tokenizer.json` alongside the weights.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        let tokenizer_path = model_dir.join("tokenizer.json");
        Self {
            model_dir,
            tokenizer_path,
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    /// Checks that every file the model needs is present (always ok in stub mode).
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be positive".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        for required in ["config.json", "model.safetensors"] {
            let path = self.model_dir.join(required);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        if !self.tokenizer_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.tokenizer_path.clone(),
            });
        }

        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
