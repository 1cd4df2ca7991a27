use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

use super::error::{EnrichmentError, EnrichmentResult};
use super::lexicon;
use crate::constants::{MAX_HEURISTIC_SCORE, RULE_BASED_CONFIDENCE};
use crate::external::{Analysis, AnalysisContext, AnalysisRequest, InferenceClient};
use crate::model::{CandidateProfile, Job, Sentiment, Stage1Result, Stage2Result};

/// A job paired with its (shared, immutable) Stage-1 result.
#[derive(Debug, Clone)]
pub struct JobWithStage1 {
    pub job: Arc<Job>,
    pub stage1: Arc<Stage1Result>,
}

impl JobWithStage1 {
    pub fn new(job: Arc<Job>, stage1: Arc<Stage1Result>) -> Self {
        Self { job, stage1 }
    }

    pub fn text(&self) -> String {
        self.job.analysis_text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// The enrichment strategies, in the order they are preferred.
pub enum StrategyKind {
    AcceleratedBatched,
    CpuParallel,
    RuleBased,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::AcceleratedBatched => "accelerated_batched",
            StrategyKind::CpuParallel => "cpu_parallel",
            StrategyKind::RuleBased => "rule_based",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The inference client plus the lock that keeps batched and individual calls apart.
///
/// Individual calls share the read side; a batched pass takes the write side.
#[derive(Clone)]
pub struct BackendHandle {
    client: Arc<dyn InferenceClient>,
    guard: Arc<RwLock<()>>,
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("client", &self.client.name())
            .field("accelerated", &self.client.is_accelerated())
            .finish()
    }
}

impl BackendHandle {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            guard: Arc::new(RwLock::new(())),
        }
    }

    pub fn name(&self) -> &str {
        self.client.name()
    }

    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    pub fn is_accelerated(&self) -> bool {
        self.client.is_accelerated()
    }

    pub async fn analyze(
        &self,
        text: &str,
        context: &AnalysisContext,
    ) -> EnrichmentResult<Analysis> {
        let _shared = self.guard.read().await;
        Ok(self.client.analyze(text, context).await?)
    }

    pub async fn analyze_batch(&self, requests: &[AnalysisRequest]) -> EnrichmentResult<Vec<Analysis>> {
        let _exclusive = self.guard.write().await;
        let analyses = self.client.analyze_batch(requests).await?;
        if analyses.len() != requests.len() {
            return Err(EnrichmentError::LengthMismatch {
                expected: requests.len(),
                got: analyses.len(),
            });
        }
        Ok(analyses)
    }
}

/// Builds the per-job context the backend sees.
pub fn analysis_context(profile: &CandidateProfile, stage1: &Stage1Result) -> AnalysisContext {
    AnalysisContext {
        profile_text: profile.query_text(),
        profile_skills: profile.skills.clone(),
        stage1_skills: stage1.basic_skills.clone(),
        stage1_compatibility: stage1.basic_compatibility,
    }
}

/// Converts a backend analysis into a [`Stage2Result`].
///
/// Every backend-driven path goes through here, so the batched and individual routes
/// produce identical results for identical analyses.
pub fn stage2_from_analysis(
    analysis: Analysis,
    input: &JobWithStage1,
    processing_time: Duration,
) -> Stage2Result {
    let text = input.text();
    let skills = lexicon::dedup_preserving_order(analysis.skills);
    let requirements = lexicon::dedup_preserving_order(analysis.requirements);

    Stage2Result {
        semantic_skills: skills,
        contextual_requirements: requirements,
        semantic_compatibility: clamp_unit(analysis.compatibility),
        sentiment: Sentiment::from_label(&analysis.sentiment),
        embedding: analysis.embedding,
        extracted_benefits: lexicon::dedup_preserving_order(analysis.benefits),
        culture_signal: lexicon::culture_signal(&text),
        processing_time,
        model_confidence: clamp_unit(analysis.confidence),
        is_fallback: false,
    }
}

/// Keyword-only enrichment used when no backend result is available.
pub fn rule_based(input: &JobWithStage1) -> Stage2Result {
    let started = Instant::now();
    let text = input.text();
    let stage1 = &input.stage1;

    let skills = lexicon::dedup_preserving_order(
        stage1
            .basic_skills
            .iter()
            .cloned()
            .chain(lexicon::find_skills(&text)),
    );
    let requirements = lexicon::dedup_preserving_order(
        stage1
            .derived_requirements()
            .into_iter()
            .chain(lexicon::find_requirements(&text)),
    );

    let sentiment = lexicon::polarity(&text);
    let benefits = lexicon::find_benefits(&text);
    let culture = lexicon::culture_signal(&text);

    Stage2Result {
        semantic_skills: skills,
        contextual_requirements: requirements,
        semantic_compatibility: (stage1.basic_compatibility * 1.1).min(MAX_HEURISTIC_SCORE),
        sentiment,
        embedding: None,
        extracted_benefits: benefits,
        culture_signal: culture,
        processing_time: started.elapsed(),
        model_confidence: RULE_BASED_CONFIDENCE,
        is_fallback: true,
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn per_job(elapsed: Duration, jobs: usize) -> Duration {
    elapsed / jobs.max(1) as u32
}

/// One way of turning a batch of Stage-1 survivors into Stage-2 results.
///
/// Implementations return exactly one result per input, in input order, or an error
/// for the whole batch.
#[async_trait]
pub trait EnrichmentStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    async fn process_batch(&self, batch: &[JobWithStage1]) -> EnrichmentResult<Vec<Stage2Result>>;
}

/// One batched backend pass per batch.
pub struct AcceleratedBatched {
    backend: BackendHandle,
    profile: Arc<CandidateProfile>,
}

impl AcceleratedBatched {
    pub fn new(backend: BackendHandle, profile: Arc<CandidateProfile>) -> Self {
        Self { backend, profile }
    }
}

#[async_trait]
impl EnrichmentStrategy for AcceleratedBatched {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AcceleratedBatched
    }

    async fn process_batch(&self, batch: &[JobWithStage1]) -> EnrichmentResult<Vec<Stage2Result>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let requests: Vec<AnalysisRequest> = batch
            .iter()
            .map(|input| AnalysisRequest {
                text: input.text(),
                context: analysis_context(&self.profile, &input.stage1),
            })
            .collect();

        let analyses = self.backend.analyze_batch(&requests).await?;
        let share = per_job(started.elapsed(), batch.len());

        debug!(
            backend = self.backend.name(),
            jobs = batch.len(),
            "Batched enrichment pass finished"
        );

        Ok(analyses
            .into_iter()
            .zip(batch)
            .map(|(analysis, input)| stage2_from_analysis(analysis, input, share))
            .collect())
    }
}

/// Individual backend calls fanned out under a semaphore.
pub struct CpuParallel {
    backend: BackendHandle,
    profile: Arc<CandidateProfile>,
    concurrency: usize,
}

impl CpuParallel {
    pub fn new(backend: BackendHandle, profile: Arc<CandidateProfile>, concurrency: usize) -> Self {
        Self {
            backend,
            profile,
            concurrency: concurrency.max(1),
        }
    }
}

#[async_trait]
impl EnrichmentStrategy for CpuParallel {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CpuParallel
    }

    async fn process_batch(&self, batch: &[JobWithStage1]) -> EnrichmentResult<Vec<Stage2Result>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (idx, input) in batch.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let backend = self.backend.clone();
            let context = analysis_context(&self.profile, &input.stage1);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    EnrichmentError::TaskFailed {
                        reason: e.to_string(),
                    }
                })?;
                let started = Instant::now();
                let analysis = backend.analyze(&input.text(), &context).await?;
                Ok::<_, EnrichmentError>((
                    idx,
                    stage2_from_analysis(analysis, &input, started.elapsed()),
                ))
            });
        }

        let mut slots: Vec<Option<Stage2Result>> = vec![None; batch.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, result) = joined.map_err(|e| EnrichmentError::TaskFailed {
                reason: e.to_string(),
            })??;
            slots[idx] = Some(result);
        }

        let filled = slots.iter().filter(|s| s.is_some()).count();
        if filled != batch.len() {
            return Err(EnrichmentError::LengthMismatch {
                expected: batch.len(),
                got: filled,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Keyword heuristics; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBased;

#[async_trait]
impl EnrichmentStrategy for RuleBased {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    async fn process_batch(&self, batch: &[JobWithStage1]) -> EnrichmentResult<Vec<Stage2Result>> {
        Ok(batch.iter().map(rule_based).collect())
    }
}
