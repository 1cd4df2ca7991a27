use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CandidateProfile, Job, ProcessedJobRecord};
use crate::pipeline::ProcessingStats;
use crate::stage1::Stage1Config;

/// Which enrichment engine a worker builds for itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineSpec {
    /// Keyword heuristics only.
    #[default]
    RuleBased,
    /// Local sentence encoder; `model_dir` falls back to `JOBSIFT_MODEL_PATH`.
    Embedding { model_dir: Option<PathBuf> },
    /// Deterministic encoder with no model files.
    EmbeddingStub,
    /// In-memory mock client.
    #[cfg(any(test, feature = "mock"))]
    Mock,
}

/// One self-contained unit of work for a pool worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub worker_id: String,
    pub jobs: Vec<Job>,
    pub profile: CandidateProfile,
    #[serde(default)]
    pub stage1: Stage1Config,
    #[serde(default)]
    pub engine: EngineSpec,
    /// Jobs whose status differs are rejected with an error record.
    pub expected_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub worker_id: String,
    /// One record per request job, in request order.
    pub records: Vec<ProcessedJobRecord>,
    pub elapsed: Duration,
}

/// Result of one [`ProcessPool::run`](super::ProcessPool::run).
#[derive(Debug, Clone, Default)]
pub struct PoolRunReport {
    pub run_id: Uuid,
    /// Records from every group that completed, grouped in input order.
    pub records: Vec<ProcessedJobRecord>,
    /// Rows the store reported as written.
    pub written: usize,
    pub stats: ProcessingStats,
}
