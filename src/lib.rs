//! Jobsift: adaptive two-stage scoring of job postings against a candidate profile.
//!
//! # Pipeline
//!
//! 1. [`HardwareAdvisor`] profiles the machine once into a [`HardwareConfig`].
//! 2. [`ThresholdAdvisor`] turns job count, hardware and [`Preferences`] into a
//!    [`ThresholdConfig`] and decides whether Stage 2 runs at all.
//! 3. [`FastFilter`] (Stage 1) extracts fields, scores every job and gates it.
//! 4. [`SemanticEnricher`] (Stage 2) enriches the admitted jobs through an ordered
//!    [`StrategyChain`]: accelerated batched, CPU parallel, rule-based.
//! 5. [`TwoStageOrchestrator`] drives the run and merges both stages into
//!    [`TwoStageResult`]s in input order.
//!
//! [`ProcessPool`] is the alternative driver: fixed groups analysed end to end by
//! isolated workers (the `jobsift-worker` binary or in-process tasks), with records
//! written back through a [`JobStore`].
//!
//! # Backends
//!
//! Structured extraction and inference sit behind [`StructuredExtractor`] and
//! [`InferenceClient`]. [`HeuristicExtractor`] and [`EmbeddingInferenceClient`] (a local
//! candle sentence encoder) are the built-in implementations.
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod enrichment;
pub mod external;
pub mod hardware;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod stage1;
pub mod threshold;

pub use config::{Config, ConfigError};
pub use embedding::{EmbeddingError, EmbeddingInferenceClient, EncoderConfig, SentenceEncoder};
pub use enrichment::{
    BatchOutcome, BatchProcessor, EnrichmentError, EnrichmentStrategy, JobWithStage1,
    SemanticEnricher, StrategyChain, StrategyKind,
};
pub use external::{
    Analysis, AnalysisContext, ExtractedFields, ExtractionError, HeuristicExtractor,
    InferenceClient, InferenceError, JobStore, StoreError, StructuredExtractor,
};
#[cfg(any(test, feature = "mock"))]
pub use external::{FailingExtractor, InMemoryJobStore, MockInferenceClient};
pub use hardware::{
    DeviceKind, DeviceProbe, HardwareAdvisor, HardwareConfig, HardwareError, PerformanceTier,
};
pub use model::{
    CandidateProfile, Job, ProcessedJobRecord, Recommendation, Sentiment, Stage1Result,
    Stage2Result, Stage2SkipReason, TwoStageResult,
};
pub use pipeline::{
    EnrichmentBackend, OrchestratorConfig, PipelineError, PipelineState, ProcessingStats,
    TwoStageOrchestrator,
};
pub use pool::{
    EngineSpec, InProcessLauncher, PoolConfig, PoolError, PoolRunReport, ProcessPool,
    SubprocessLauncher, WorkerLauncher,
};
pub use stage1::{FastFilter, FilterError, Stage1Config, Stage1Weights};
pub use threshold::{Preferences, ThresholdAdvisor, ThresholdConfig};
