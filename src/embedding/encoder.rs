use std::sync::Arc;

use candle_core::{Device, Tensor};
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::bert::BertSentenceModel;
use super::config::EncoderConfig;
use super::device::{device_label, is_accelerated, select_device};
use super::error::EmbeddingError;
use super::utils::load_batch_tokenizer;

enum EncoderBackend {
    Model {
        model: Arc<Mutex<BertSentenceModel>>,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub {
        device: Device,
    },
}

/// Sentence encoder (supports stub mode).
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({})", device_label(device)),
                    EncoderBackend::Stub { device } => format!("Stub({})", device_label(device)),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence encoder running in STUB mode (testing only)");
            return Ok(Self {
                embedding_dim: config.embedding_dim,
                backend: EncoderBackend::Stub {
                    device: Device::Cpu,
                },
                config,
            });
        }

        let device = select_device();
        debug!(device = device_label(&device), "Selected compute device for encoder");

        let tokenizer = load_batch_tokenizer(&config.tokenizer_path, config.max_seq_len)?;
        let model = BertSentenceModel::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::Load {
                component: "model",
                reason: e.to_string(),
            }
        })?;
        let embedding_dim = model.hidden_size();

        info!(
            model_dir = %config.model_dir.display(),
            device = device_label(&device),
            embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model: Arc::new(Mutex::new(model)),
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
            embedding_dim,
        })
    }

    /// Encodes all texts in one padded forward pass.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => Self::embed_with_model(texts, model, tokenizer, device),
            EncoderBackend::Stub { .. } => Ok(texts.iter().map(|t| self.embed_stub(t)).collect()),
        }
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| EmbeddingError::Encode {
                reason: "encoder returned no vector".to_string(),
            })
    }

    fn embed_with_model(
        texts: &[&str],
        model: &Mutex<BertSentenceModel>,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Encode {
                reason: format!("tokenization: {e}"),
            })?;

        let ids = encodings
            .iter()
            .map(|enc| Tensor::new(enc.get_ids(), device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|enc| Tensor::new(enc.get_attention_mask(), device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;

        debug!(
            texts = texts.len(),
            seq_len = input_ids.dim(1)?,
            "Encoder forward pass"
        );

        let pooled = model.lock().encode(&input_ids, &attention_mask)?;
        Ok(pooled.to_vec2::<f32>()?)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut embedding = Vec::with_capacity(self.embedding_dim);
        for _ in 0..self.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            embedding.push(((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub { .. })
    }

    /// `true` when a real model runs on a GPU.
    pub fn is_accelerated(&self) -> bool {
        match &self.backend {
            EncoderBackend::Model { device, .. } => is_accelerated(device),
            EncoderBackend::Stub { .. } => false,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

/// Cosine similarity of two vectors (0 when either is zero-length).
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}
