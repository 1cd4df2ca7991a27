//! Cross-cutting, shared constants.
//!
//! Scores are `f64` in `[0.0, 1.0]` throughout the crate. Thresholds that decide a
//! recommendation or a gate live here so every stage agrees on the same boundaries.

/// Upper bound for any heuristic (non-model) compatibility score.
pub const MAX_HEURISTIC_SCORE: f64 = 0.95;

/// Final compatibility at or above this is recommended for application.
pub const APPLY_THRESHOLD: f64 = 0.70;

/// Final compatibility at or above this (and below [`APPLY_THRESHOLD`]) is marked for review.
pub const REVIEW_THRESHOLD: f64 = 0.40;

/// Default number of blocking Stage-1 workers.
pub const DEFAULT_CPU_WORKERS: usize = 10;

/// Minimum number of Stage-2 batches before the batch processor is preferred over
/// individual calls.
pub const BATCH_ROUTE_MIN_BATCHES: usize = 4;

/// Default number of jobs per process-pool group.
pub const DEFAULT_GROUP_SIZE: usize = 5;

/// Default number of process-pool workers.
pub const DEFAULT_POOL_WORKERS: usize = 2;

/// Lifecycle status a job must carry to be picked up by the process pool.
pub const DEFAULT_EXPECTED_STATUS: &str = "scraped";

/// Confidence reported by rule-based Stage-2 results.
pub const RULE_BASED_CONFIDENCE: f64 = 0.3;

/// Default embedding dimension of the bundled sentence encoder (MiniLM-class models).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default max tokens fed to the sentence encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Wall-clock limit for one process-pool group.
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 300;

/// File name of the subprocess worker binary.
pub const WORKER_BINARY: &str = "jobsift-worker";
