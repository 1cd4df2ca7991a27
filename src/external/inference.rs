use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::InferenceError;

/// Per-job context handed to the inference client alongside the posting text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Profile rendered as text (the semantic query).
    pub profile_text: String,
    pub profile_skills: Vec<String>,
    pub stage1_skills: Vec<String>,
    pub stage1_compatibility: f64,
}

/// One unit of work for [`InferenceClient::analyze_batch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub context: AnalysisContext,
}

/// Semantic analysis of one posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
    pub compatibility: f64,
    pub confidence: f64,
    pub benefits: Vec<String>,
    /// Free-form label (`positive` / `neutral` / `negative`).
    pub sentiment: String,
    pub reasoning: String,
    pub embedding: Option<Vec<f32>>,
}

/// External LLM / embedding inference client.
///
/// `analyze_batch` must return exactly one [`Analysis`] per request, in request order.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    fn name(&self) -> &str;

    /// `false` when the backend could not be reached at startup.
    fn is_available(&self) -> bool {
        true
    }

    /// `true` when inference runs on an accelerated device and batching pays off.
    fn is_accelerated(&self) -> bool {
        false
    }

    async fn analyze(
        &self,
        text: &str,
        context: &AnalysisContext,
    ) -> Result<Analysis, InferenceError>;

    async fn analyze_batch(
        &self,
        requests: &[AnalysisRequest],
    ) -> Result<Vec<Analysis>, InferenceError> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.analyze(&request.text, &request.context).await?);
        }
        Ok(results)
    }
}
