use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::combine::combine;
use super::error::PipelineError;
use super::state::PipelineState;
use super::stats::ProcessingStats;
use crate::constants::BATCH_ROUTE_MIN_BATCHES;
use crate::enrichment::{JobWithStage1, SemanticEnricher, rule_based};
use crate::external::{HeuristicExtractor, InferenceClient, StructuredExtractor};
use crate::hardware::HardwareConfig;
use crate::model::{
    CandidateProfile, Job, Stage1Result, Stage2Result, Stage2SkipReason, TwoStageResult,
};
use crate::stage1::{FastFilter, Stage1Config};
use crate::threshold::{Preferences, ThresholdAdvisor, ThresholdConfig};

/// Where Stage 2 gets its analysis from.
#[derive(Clone, Default)]
pub enum EnrichmentBackend {
    /// Keyword heuristics only.
    #[default]
    RulesOnly,
    /// An inference client, probed once at build time.
    Client(Arc<dyn InferenceClient>),
    /// Stage 2 is not wired at all.
    Disabled,
}

/// Run-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub preferences: Preferences,
    /// Master switch for Stage 2.
    pub stage2_enabled: bool,
    /// Overrides the tier-derived Stage-2 concurrency.
    pub max_concurrency: Option<usize>,
    /// Minimum batch count for the batched Stage-2 route.
    pub batch_route_min_batches: usize,
    /// Replaces the computed Stage-2 deadline.
    pub stage2_deadline: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            preferences: Preferences::default(),
            stage2_enabled: true,
            max_concurrency: None,
            batch_route_min_batches: BATCH_ROUTE_MIN_BATCHES,
            stage2_deadline: None,
        }
    }
}

pub struct OrchestratorBuilder {
    profile: Arc<CandidateProfile>,
    hardware: HardwareConfig,
    extractor: Arc<dyn StructuredExtractor>,
    backend: EnrichmentBackend,
    stage1: Stage1Config,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn extractor(mut self, extractor: Arc<dyn StructuredExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn inference(mut self, client: Arc<dyn InferenceClient>) -> Self {
        self.backend = EnrichmentBackend::Client(client);
        self
    }

    pub fn backend(mut self, backend: EnrichmentBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn stage1_config(mut self, config: Stage1Config) -> Self {
        self.stage1 = config;
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn preferences(mut self, preferences: Preferences) -> Self {
        self.config.preferences = preferences;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = Some(max_concurrency);
        self
    }

    pub fn build(self) -> Result<TwoStageOrchestrator, PipelineError> {
        if self.config.max_concurrency == Some(0) {
            return Err(PipelineError::InvalidConfig {
                reason: "max_concurrency must be at least 1".to_string(),
            });
        }
        if self.config.stage2_deadline == Some(Duration::ZERO) {
            return Err(PipelineError::InvalidConfig {
                reason: "stage2_deadline must be positive".to_string(),
            });
        }

        let filter = FastFilter::new(Arc::clone(&self.profile), self.extractor, self.stage1)?;
        let concurrency = self
            .config
            .max_concurrency
            .unwrap_or_else(|| self.hardware.stage2_concurrency());

        let enricher = match self.backend {
            EnrichmentBackend::RulesOnly => Some(SemanticEnricher::rules_only(self.profile)),
            EnrichmentBackend::Disabled => None,
            EnrichmentBackend::Client(client) => {
                match SemanticEnricher::initialize(client, self.profile, concurrency) {
                    Ok(enricher) => Some(enricher),
                    Err(e) => {
                        warn!(error = %e, "Enrichment backend unavailable, stage 2 disabled for this orchestrator");
                        None
                    }
                }
            }
        };

        info!(
            tier = %self.hardware.performance_tier,
            stage2_concurrency = concurrency,
            enrichment = ?enricher.as_ref().map(|e| e.strategies()),
            "Two-stage orchestrator ready"
        );

        Ok(TwoStageOrchestrator {
            filter,
            enricher,
            hardware: self.hardware,
            advisor: ThresholdAdvisor::new(),
            concurrency,
            config: self.config,
            stats: Mutex::new(ProcessingStats::default()),
        })
    }
}

/// Drives `INIT → STAGE1 → FILTER → STAGE2 → COMBINE → DONE` for a batch of jobs.
pub struct TwoStageOrchestrator {
    filter: FastFilter,
    enricher: Option<SemanticEnricher>,
    hardware: HardwareConfig,
    advisor: ThresholdAdvisor,
    concurrency: usize,
    config: OrchestratorConfig,
    stats: Mutex<ProcessingStats>,
}

impl std::fmt::Debug for TwoStageOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoStageOrchestrator")
            .field("hardware", &self.hardware)
            .field("enricher", &self.enricher)
            .field("concurrency", &self.concurrency)
            .field("config", &self.config)
            .finish()
    }
}

/// Stage-2 admission decision for every job of a run.
struct Admission {
    /// Indices sent to Stage 2, in input order.
    admitted: Vec<usize>,
    /// Why each other job is Stage-1-only.
    skipped: HashMap<usize, Stage2SkipReason>,
}

/// Stage-2 output, one slot per admitted job.
struct Stage2Output {
    /// `None` means the deadline expired first.
    slots: Vec<Option<Stage2Result>>,
    /// Tasks that died and were replaced by a rule-based result.
    task_failures: usize,
}

struct Run {
    state: PipelineState,
}

impl Run {
    fn advance(&mut self, next: PipelineState) {
        if !self.state.can_advance_to(next) {
            warn!(from = %self.state, to = %next, "Unexpected pipeline state change");
        }
        debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
    }
}

impl TwoStageOrchestrator {
    pub fn builder(profile: Arc<CandidateProfile>, hardware: HardwareConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            profile,
            hardware,
            extractor: Arc::new(HeuristicExtractor::new()),
            backend: EnrichmentBackend::default(),
            stage1: Stage1Config::default(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn hardware(&self) -> &HardwareConfig {
        &self.hardware
    }

    /// `false` when the backend failed its startup probe (or none was wired).
    pub fn stage2_available(&self) -> bool {
        self.enricher.is_some()
    }

    pub fn enricher(&self) -> Option<&SemanticEnricher> {
        self.enricher.as_ref()
    }

    pub fn thresholds_for(&self, job_count: usize) -> ThresholdConfig {
        self.advisor
            .calculate(job_count, &self.hardware, &self.config.preferences)
    }

    pub fn stats(&self) -> ProcessingStats {
        self.stats.lock().clone()
    }

    pub fn reset_stats(&self) {
        self.stats.lock().reset();
    }

    /// Ranks every job. Never fails; output length and order match `jobs`.
    #[instrument(skip_all, fields(jobs = jobs.len(), run_id = %Uuid::new_v4()))]
    pub async fn process(&self, jobs: &[Job]) -> Vec<TwoStageResult> {
        let started = Instant::now();
        let mut run = Run {
            state: PipelineState::Init,
        };

        let thresholds = self.thresholds_for(jobs.len());
        let gate_open = self.config.stage2_enabled
            && self.advisor.should_enable_stage2(
                jobs.len(),
                &self.hardware,
                self.stage2_available(),
            );

        run.advance(PipelineState::Stage1);
        let jobs: Vec<Arc<Job>> = jobs.iter().cloned().map(Arc::new).collect();
        let stage1: Vec<Arc<Stage1Result>> = self
            .filter
            .process_batch(&jobs)
            .await
            .into_iter()
            .map(Arc::new)
            .collect();

        run.advance(PipelineState::Filter);
        let mut admission = admit(&stage1, &thresholds);
        let blanket = if self.enricher.is_none() {
            Some(Stage2SkipReason::BackendUnavailable)
        } else if !gate_open {
            Some(Stage2SkipReason::Disabled)
        } else {
            None
        };
        if let Some(reason) = blanket {
            for idx in admission.admitted.drain(..) {
                admission.skipped.insert(idx, reason);
            }
        }

        debug!(
            threshold = thresholds.phase1_threshold,
            max_phase2_jobs = thresholds.max_phase2_jobs,
            admitted = admission.admitted.len(),
            "Stage-2 admission decided"
        );

        let mut stage2: Vec<Option<Stage2Result>> = vec![None; jobs.len()];
        let mut task_failures = 0;
        if let Some(enricher) = self.enricher.as_ref().filter(|_| !admission.admitted.is_empty()) {
            run.advance(PipelineState::Stage2);
            let inputs: Vec<JobWithStage1> = admission
                .admitted
                .iter()
                .map(|&idx| JobWithStage1::new(Arc::clone(&jobs[idx]), Arc::clone(&stage1[idx])))
                .collect();

            let output = self.run_stage2(enricher, &inputs, &thresholds).await;
            task_failures = output.task_failures;
            for (&idx, result) in admission.admitted.iter().zip(output.slots) {
                match result {
                    Some(result) => stage2[idx] = Some(result),
                    None => {
                        admission
                            .skipped
                            .insert(idx, Stage2SkipReason::DeadlineExpired);
                    }
                }
            }
        }

        run.advance(PipelineState::Combine);
        let results: Vec<TwoStageResult> = jobs
            .into_iter()
            .zip(stage1)
            .zip(stage2)
            .enumerate()
            .map(|(idx, ((job, s1), s2))| {
                combine(
                    job,
                    Arc::unwrap_or_clone(s1),
                    s2,
                    admission.skipped.get(&idx).copied(),
                )
            })
            .collect();

        run.advance(PipelineState::Done);
        self.record(&results, task_failures, started.elapsed());
        results
    }

    async fn run_stage2(
        &self,
        enricher: &SemanticEnricher,
        inputs: &[JobWithStage1],
        thresholds: &ThresholdConfig,
    ) -> Stage2Output {
        let budget = self
            .config
            .stage2_deadline
            .unwrap_or_else(|| thresholds.timeout().max(self.hardware.per_batch_timeout));
        let deadline = tokio::time::Instant::now() + budget;
        let batch_size = thresholds.phase2_batch_size.max(1);
        let batches = inputs.len().div_ceil(batch_size);

        if batches >= self.config.batch_route_min_batches {
            debug!(batches, batch_size, "Stage 2 via batch processor");
            let outcome = enricher.process_batch(inputs, batch_size, Some(deadline)).await;
            return Stage2Output {
                slots: outcome.results,
                task_failures: 0,
            };
        }

        debug!(
            jobs = inputs.len(),
            concurrency = self.concurrency,
            "Stage 2 via individual calls"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().cloned().enumerate() {
            let enricher = enricher.clone();
            let semaphore = Arc::clone(&semaphore);
            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                enricher.enrich(&input).await
            });
            positions.insert(handle.id(), idx);
        }

        let mut slots: Vec<Option<Stage2Result>> = vec![None; inputs.len()];
        let mut completed = 0usize;
        let mut task_failures = 0usize;
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await {
                Ok(Some(Ok((id, result)))) => {
                    if let Some(&idx) = positions.get(&id) {
                        slots[idx] = Some(result);
                        completed += 1;
                        debug!(completed, total = inputs.len(), "Stage-2 job enriched");
                    }
                }
                Ok(Some(Err(e))) => {
                    if let Some(&idx) = positions.get(&e.id()) {
                        let input = &inputs[idx];
                        warn!(job_id = %input.job.id, error = %e, "Stage-2 task failed, using rules");
                        slots[idx] = Some(rule_based(input));
                        completed += 1;
                        task_failures += 1;
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        completed,
                        remaining = inputs.len() - completed,
                        budget_secs = budget.as_secs_f64(),
                        "Stage-2 deadline expired, keeping partial results"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        Stage2Output {
            slots,
            task_failures,
        }
    }

    /// `stage2_failures` counts Stage-2 tasks that died and fell back to rules.
    fn record(&self, results: &[TwoStageResult], stage2_failures: usize, elapsed: Duration) {
        let mut run = ProcessingStats {
            runs: 1,
            total_jobs: results.len(),
            processed_jobs: results.len(),
            failed_jobs: stage2_failures,
            ..Default::default()
        };
        for result in results {
            if result.stage1.extraction_error.is_some() {
                run.failed_jobs += 1;
            }
            if result.stage1.passes_filter {
                run.stage1_passed += 1;
            }
            if let Some(s2) = &result.stage2 {
                run.stage2_enriched += 1;
                if s2.is_fallback {
                    run.fallback_jobs += 1;
                }
            }
        }
        run.elapsed = elapsed;

        info!(
            jobs = run.total_jobs,
            stage1_passed = run.stage1_passed,
            stage2_enriched = run.stage2_enriched,
            fallback = run.fallback_jobs,
            failed = run.failed_jobs,
            elapsed_ms = elapsed.as_millis() as u64,
            "Two-stage run finished"
        );

        self.stats.lock().merge(&run);
    }
}

/// Passing jobs at or above the threshold, highest Stage-1 score first, up to the cap.
fn admit(stage1: &[Arc<Stage1Result>], thresholds: &ThresholdConfig) -> Admission {
    let mut skipped = HashMap::new();
    let mut eligible = Vec::new();

    for (idx, result) in stage1.iter().enumerate() {
        if !result.passes_filter {
            skipped.insert(idx, Stage2SkipReason::FilteredOut);
        } else if result.basic_compatibility < thresholds.phase1_threshold {
            skipped.insert(idx, Stage2SkipReason::BelowThreshold);
        } else {
            eligible.push(idx);
        }
    }

    // Stable: equal scores keep input order.
    eligible.sort_by(|&a, &b| {
        stage1[b]
            .basic_compatibility
            .total_cmp(&stage1[a].basic_compatibility)
    });
    for idx in eligible.drain(thresholds.max_phase2_jobs.min(eligible.len())..) {
        skipped.insert(idx, Stage2SkipReason::CapacityExceeded);
    }
    eligible.sort_unstable();

    Admission {
        admitted: eligible,
        skipped,
    }
}
