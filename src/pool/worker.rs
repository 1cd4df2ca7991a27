use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::types::{EngineSpec, WorkerRequest, WorkerResponse};
use crate::embedding::{EmbeddingInferenceClient, EncoderConfig, SentenceEncoder};
use crate::enrichment::{JobWithStage1, SemanticEnricher};
use crate::external::{HeuristicExtractor, InferenceClient};
use crate::model::{CandidateProfile, Job, ProcessedJobRecord, Stage2SkipReason};
use crate::pipeline::combine;
use crate::stage1::FastFilter;

/// Builds the worker's own enrichment engine. Falls back to rules when the backend
/// cannot be loaded or fails its probe.
pub async fn build_enricher(
    engine: &EngineSpec,
    profile: Arc<CandidateProfile>,
) -> SemanticEnricher {
    let client: Arc<dyn InferenceClient> = match engine {
        EngineSpec::RuleBased => return SemanticEnricher::rules_only(profile),
        EngineSpec::EmbeddingStub => {
            match SentenceEncoder::load(EncoderConfig::stub()) {
                Ok(encoder) => Arc::new(EmbeddingInferenceClient::new(encoder)),
                Err(e) => {
                    warn!(error = %e, "Stub encoder failed to load, using rules");
                    return SemanticEnricher::rules_only(profile);
                }
            }
        }
        EngineSpec::Embedding { model_dir } => {
            let config = match model_dir {
                Some(dir) => EncoderConfig::new(dir.clone()),
                None => EncoderConfig::from_env(),
            };
            let loaded = tokio::task::spawn_blocking(move || SentenceEncoder::load(config)).await;
            match loaded {
                Ok(Ok(encoder)) => Arc::new(EmbeddingInferenceClient::new(encoder)),
                Ok(Err(e)) => {
                    warn!(error = %e, "Sentence encoder failed to load, using rules");
                    return SemanticEnricher::rules_only(profile);
                }
                Err(e) => {
                    warn!(error = %e, "Encoder load task failed, using rules");
                    return SemanticEnricher::rules_only(profile);
                }
            }
        }
        #[cfg(any(test, feature = "mock"))]
        EngineSpec::Mock => Arc::new(crate::external::MockInferenceClient::new()),
    };

    SemanticEnricher::initialize(client, Arc::clone(&profile), 1).unwrap_or_else(|e| {
        warn!(error = %e, "Enrichment backend unavailable, using rules");
        SemanticEnricher::rules_only(profile)
    })
}

/// Rejects jobs the worker must not analyse.
pub fn validate_job(job: &Job, expected_status: &str) -> Result<(), String> {
    if job.id.trim().is_empty() {
        return Err("job has no id".to_string());
    }
    if job.title.trim().is_empty() {
        return Err("job has no title".to_string());
    }
    if job.description.trim().is_empty() {
        return Err("job has no description".to_string());
    }
    if job.status != expected_status {
        return Err(format!(
            "job status is '{}', expected '{expected_status}'",
            job.status
        ));
    }
    Ok(())
}

/// Runs combined Stage-1 + Stage-2 analysis over one group.
///
/// Never fails: invalid jobs and jobs that cannot be analysed become
/// [`ProcessedJobRecord::processing_error`] records.
pub async fn analyze_group(request: WorkerRequest) -> WorkerResponse {
    let started = Instant::now();
    let WorkerRequest {
        worker_id,
        jobs,
        profile,
        stage1,
        engine,
        expected_status,
    } = request;

    info!(worker_id = %worker_id, jobs = jobs.len(), ?engine, "Worker group started");

    let profile = Arc::new(profile);
    let filter = FastFilter::new(
        Arc::clone(&profile),
        Arc::new(HeuristicExtractor::new()),
        stage1,
    );
    let filter = match filter {
        Ok(filter) => filter,
        Err(e) => {
            warn!(worker_id = %worker_id, error = %e, "Stage-1 filter could not be built");
            let records = jobs
                .iter()
                .map(|job| {
                    ProcessedJobRecord::processing_error(
                        job,
                        e.to_string(),
                        &worker_id,
                        started.elapsed(),
                    )
                })
                .collect();
            return WorkerResponse {
                worker_id,
                records,
                elapsed: started.elapsed(),
            };
        }
    };
    let enricher = build_enricher(&engine, Arc::clone(&profile)).await;

    let mut records = Vec::with_capacity(jobs.len());
    for job in jobs {
        let job_started = Instant::now();
        if let Err(reason) = validate_job(&job, &expected_status) {
            debug!(worker_id = %worker_id, job_id = %job.id, reason = %reason, "Job rejected");
            records.push(ProcessedJobRecord::processing_error(
                &job,
                reason,
                &worker_id,
                job_started.elapsed(),
            ));
            continue;
        }

        let job = Arc::new(job);
        let s1 = filter.evaluate(&job, &worker_id);
        if let Some(error) = &s1.extraction_error {
            records.push(ProcessedJobRecord::processing_error(
                &job,
                error.clone(),
                &worker_id,
                job_started.elapsed(),
            ));
            continue;
        }

        let (s2, skip_reason) = if s1.passes_filter {
            let input = JobWithStage1::new(Arc::clone(&job), Arc::new(s1.clone()));
            (Some(enricher.enrich(&input).await), None)
        } else {
            (None, Some(Stage2SkipReason::FilteredOut))
        };

        let result = combine(job, s1, s2, skip_reason);
        records.push(ProcessedJobRecord::from_result(
            &result,
            &worker_id,
            job_started.elapsed(),
        ));
    }

    let elapsed = started.elapsed();
    info!(
        worker_id = %worker_id,
        records = records.len(),
        errors = records.iter().filter(|r| r.is_error()).count(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Worker group finished"
    );

    WorkerResponse {
        worker_id,
        records,
        elapsed,
    }
}
