//! In-memory test doubles for the external collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ExtractionError, InferenceError, StoreError};
use super::extractor::{ExtractedFields, StructuredExtractor};
use super::inference::{Analysis, AnalysisContext, AnalysisRequest, InferenceClient};
use super::store::JobStore;
use crate::enrichment::lexicon;
use crate::model::{Job, ProcessedJobRecord};

/// Deterministic inference client.
///
/// The same `(text, context)` always yields the same [`Analysis`], whether it arrives
/// through `analyze` or `analyze_batch`. Requests whose text contains `fail_marker`
/// fail; a batch containing such a request fails as a whole. Single requests containing
/// `panic_marker` panic inside `analyze`.
#[derive(Debug, Default)]
pub struct MockInferenceClient {
    unavailable: bool,
    accelerated: bool,
    fail_marker: Option<String>,
    panic_marker: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports itself as running on an accelerated device.
    pub fn accelerated() -> Self {
        Self {
            accelerated: true,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_fail_marker(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    pub fn with_panic_marker(mut self, marker: impl Into<String>) -> Self {
        self.panic_marker = Some(marker.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of single `analyze` calls served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `analyze_batch` calls served.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `analyze` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, text: &str) -> bool {
        self.fail_marker
            .as_deref()
            .is_some_and(|marker| text.contains(marker))
    }

    /// The canned analysis for one request.
    pub fn respond(text: &str, context: &AnalysisContext) -> Analysis {
        let skills = lexicon::find_skills(text);
        let compatibility = (0.4 + context.stage1_compatibility * 0.6).min(1.0);
        let sentiment = lexicon::polarity(text);

        Analysis {
            requirements: lexicon::find_requirements(text),
            benefits: lexicon::find_benefits(text),
            sentiment: format!("{:?}", sentiment).to_lowercase(),
            reasoning: format!("{} skills matched by mock", skills.len()),
            skills,
            compatibility,
            confidence: 0.9,
            embedding: None,
        }
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    async fn analyze(
        &self,
        text: &str,
        context: &AnalysisContext,
    ) -> Result<Analysis, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(marker) = self.panic_marker.as_deref().filter(|m| text.contains(*m)) {
            panic!("mock inference panicked on {marker}");
        }
        if self.unavailable {
            return Err(InferenceError::Unavailable {
                reason: "mock marked unavailable".to_string(),
            });
        }
        if self.should_fail(text) {
            return Err(InferenceError::Failed {
                reason: "injected failure".to_string(),
            });
        }

        Ok(Self::respond(text, context))
    }

    async fn analyze_batch(
        &self,
        requests: &[AnalysisRequest],
    ) -> Result<Vec<Analysis>, InferenceError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable {
            return Err(InferenceError::Unavailable {
                reason: "mock marked unavailable".to_string(),
            });
        }
        if requests.iter().any(|r| self.should_fail(&r.text)) {
            return Err(InferenceError::Failed {
                reason: "injected batch failure".to_string(),
            });
        }

        Ok(requests
            .iter()
            .map(|r| Self::respond(&r.text, &r.context))
            .collect())
    }
}

/// Extractor that fails for every job whose description contains `marker`.
#[derive(Debug, Clone)]
pub struct FailingExtractor {
    marker: String,
    panic: bool,
}

impl FailingExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            panic: false,
        }
    }

    /// Panics instead of returning an error.
    pub fn panicking(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            panic: true,
        }
    }
}

impl StructuredExtractor for FailingExtractor {
    fn extract(&self, job: &Job) -> Result<ExtractedFields, ExtractionError> {
        if job.description.contains(&self.marker) {
            if self.panic {
                panic!("extractor blew up on job {}", job.id);
            }
            return Err(ExtractionError::Failed {
                reason: format!("marker found in job {}", job.id),
            });
        }

        Ok(ExtractedFields {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            confidence: 0.8,
            ..Default::default()
        })
    }
}

/// Store that keeps the latest record per job id.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    records: Mutex<HashMap<String, ProcessedJobRecord>>,
    bulk_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, job_id: &str) -> Option<ProcessedJobRecord> {
        self.records.lock().get(job_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn apply_bulk(&self, records: &[ProcessedJobRecord]) -> Result<usize, StoreError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                reason: "mock store configured to fail".to_string(),
            });
        }

        let mut guard = self.records.lock();
        for record in records {
            guard.insert(record.job.id.clone(), record.clone());
        }
        Ok(records.len())
    }
}
