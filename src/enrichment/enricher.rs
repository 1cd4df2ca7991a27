use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::batch::{BatchOutcome, BatchProcessor};
use super::chain::StrategyChain;
use super::error::{EnrichmentError, EnrichmentResult};
use super::strategy::{
    BackendHandle, JobWithStage1, StrategyKind, analysis_context, rule_based, stage2_from_analysis,
};
use crate::external::InferenceClient;
use crate::model::{CandidateProfile, Stage2Result};

/// Stage-2 semantic enricher.
///
/// Owns the inference backend (if any) and the strategy chain chosen for it. Individual
/// calls fall back to rule-based heuristics per job; batched calls fall back per batch.
#[derive(Debug, Clone)]
pub struct SemanticEnricher {
    backend: Option<BackendHandle>,
    profile: Arc<CandidateProfile>,
    chain: Arc<StrategyChain>,
}

impl SemanticEnricher {
    /// Probes the backend once and selects the strategy chain.
    ///
    /// Fails when a backend was supplied but reports itself unavailable; callers treat
    /// that as "Stage 2 disabled for this run".
    pub fn initialize(
        client: Arc<dyn InferenceClient>,
        profile: Arc<CandidateProfile>,
        concurrency: usize,
    ) -> EnrichmentResult<Self> {
        if !client.is_available() {
            return Err(EnrichmentError::BackendUnavailable {
                reason: format!("{} did not respond to startup probe", client.name()),
            });
        }

        let backend = BackendHandle::new(client);
        let chain = StrategyChain::probe(Some(&backend), Arc::clone(&profile), concurrency);

        info!(
            backend = backend.name(),
            accelerated = backend.is_accelerated(),
            primary = %chain.primary(),
            "Semantic enricher initialized"
        );

        Ok(Self {
            backend: Some(backend),
            profile,
            chain: Arc::new(chain),
        })
    }

    /// Enricher without a backend; every result is rule-based.
    pub fn rules_only(profile: Arc<CandidateProfile>) -> Self {
        Self {
            backend: None,
            profile,
            chain: Arc::new(StrategyChain::rules_only()),
        }
    }

    /// Uses a caller-built chain (the backend, if any, is only used for individual calls).
    pub fn with_chain(
        client: Option<Arc<dyn InferenceClient>>,
        profile: Arc<CandidateProfile>,
        chain: StrategyChain,
    ) -> Self {
        Self {
            backend: client.map(BackendHandle::new),
            profile,
            chain: Arc::new(chain),
        }
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_accelerated(&self) -> bool {
        self.backend.as_ref().is_some_and(BackendHandle::is_accelerated)
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    /// Enriches one job with an individual backend call.
    ///
    /// Never fails: a backend error yields a rule-based result for this job only.
    pub async fn enrich(&self, input: &JobWithStage1) -> Stage2Result {
        let Some(backend) = &self.backend else {
            return rule_based(input);
        };

        let started = Instant::now();
        let context = analysis_context(&self.profile, &input.stage1);
        match backend.analyze(&input.text(), &context).await {
            Ok(analysis) => stage2_from_analysis(analysis, input, started.elapsed()),
            Err(e) => {
                warn!(job_id = %input.job.id, error = %e, "Individual enrichment failed, using rules");
                rule_based(input)
            }
        }
    }

    /// Builds a batch processor over this enricher's chain.
    pub fn batch_processor(&self, batch_size: usize) -> BatchProcessor {
        BatchProcessor::new(Arc::clone(&self.chain), batch_size)
    }

    /// Enriches all inputs in batches of `batch_size`.
    pub async fn process_batch(
        &self,
        inputs: &[JobWithStage1],
        batch_size: usize,
        deadline: Option<tokio::time::Instant>,
    ) -> BatchOutcome {
        let processor = self.batch_processor(batch_size);
        debug!(
            jobs = inputs.len(),
            batches = processor.batch_count(inputs.len()),
            batch_size = processor.batch_size(),
            "Starting batched enrichment"
        );
        processor.process(inputs, deadline).await
    }

    pub fn strategies(&self) -> Vec<StrategyKind> {
        self.chain.kinds()
    }
}
