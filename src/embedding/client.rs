use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::encoder::{SentenceEncoder, cosine};
use super::error::EmbeddingError;
use crate::constants::MAX_HEURISTIC_SCORE;
use crate::enrichment::lexicon;
use crate::external::{Analysis, AnalysisContext, AnalysisRequest, InferenceClient, InferenceError};

/// Weight of the profile/posting similarity in the blended score.
const SIMILARITY_WEIGHT: f64 = 0.6;
const EMBEDDING_CONFIDENCE: f64 = 0.75;

/// [`InferenceClient`] backed by the local sentence encoder.
///
/// Scores a posting by cosine similarity to the profile text, blended with the Stage-1
/// score; skills, requirements, benefits and sentiment come from the keyword lexicon.
/// A batch is one forward pass.
#[derive(Debug, Clone)]
pub struct EmbeddingInferenceClient {
    encoder: Arc<SentenceEncoder>,
}

impl EmbeddingInferenceClient {
    pub fn new(encoder: SentenceEncoder) -> Self {
        Self {
            encoder: Arc::new(encoder),
        }
    }

    pub fn encoder(&self) -> &SentenceEncoder {
        &self.encoder
    }

    fn compose(
        request: &AnalysisRequest,
        profile_vec: &[f32],
        job_vec: Vec<f32>,
    ) -> Analysis {
        let similarity = f64::from(cosine(profile_vec, &job_vec));
        let similarity01 = ((similarity + 1.0) / 2.0).clamp(0.0, 1.0);
        let compatibility = (SIMILARITY_WEIGHT * similarity01
            + (1.0 - SIMILARITY_WEIGHT) * request.context.stage1_compatibility)
            .min(MAX_HEURISTIC_SCORE);

        let skills = lexicon::dedup_preserving_order(
            request
                .context
                .stage1_skills
                .iter()
                .cloned()
                .chain(lexicon::find_skills(&request.text)),
        );
        let sentiment = lexicon::polarity(&request.text);

        Analysis {
            skills,
            requirements: lexicon::find_requirements(&request.text),
            compatibility,
            confidence: EMBEDDING_CONFIDENCE,
            benefits: lexicon::find_benefits(&request.text),
            sentiment: format!("{sentiment:?}").to_lowercase(),
            reasoning: format!("profile similarity {similarity:.3}"),
            embedding: Some(job_vec),
        }
    }
}

#[async_trait]
impl InferenceClient for EmbeddingInferenceClient {
    fn name(&self) -> &str {
        if self.encoder.is_stub() {
            "embedding-stub"
        } else {
            "embedding"
        }
    }

    fn is_accelerated(&self) -> bool {
        self.encoder.is_accelerated()
    }

    async fn analyze(
        &self,
        text: &str,
        context: &AnalysisContext,
    ) -> Result<Analysis, InferenceError> {
        let request = AnalysisRequest {
            text: text.to_string(),
            context: context.clone(),
        };
        self.analyze_batch(std::slice::from_ref(&request))
            .await?
            .pop()
            .ok_or_else(|| InferenceError::InvalidResponse {
                reason: "encoder returned no analysis".to_string(),
            })
    }

    async fn analyze_batch(
        &self,
        requests: &[AnalysisRequest],
    ) -> Result<Vec<Analysis>, InferenceError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        // Profile texts first, then postings; all in one pass.
        let mut texts: Vec<String> = requests
            .iter()
            .map(|r| r.context.profile_text.clone())
            .collect();
        texts.extend(requests.iter().map(|r| r.text.clone()));

        let encoder = Arc::clone(&self.encoder);
        let vectors = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            encoder.embed_batch(&refs)
        })
        .await
        .map_err(|e| InferenceError::Failed {
            reason: format!("encoder task failed: {e}"),
        })??;

        if vectors.len() != requests.len() * 2 {
            return Err(EmbeddingError::Encode {
                reason: format!(
                    "expected {} vectors, got {}",
                    requests.len() * 2,
                    vectors.len()
                ),
            }
            .into());
        }

        let (profiles, jobs) = vectors.split_at(requests.len());
        debug!(jobs = requests.len(), "Encoder batch analyzed");

        Ok(requests
            .iter()
            .zip(profiles)
            .zip(jobs)
            .map(|((request, profile), job)| Self::compose(request, profile, job.clone()))
            .collect())
    }
}
