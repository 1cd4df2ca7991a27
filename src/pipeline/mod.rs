//! Two-stage orchestration: Stage-1 filter, admission, Stage-2 enrichment and the merge.

mod combine;
mod error;
mod orchestrator;
mod state;
mod stats;


pub use combine::combine;
pub use error::PipelineError;
pub use orchestrator::{
    EnrichmentBackend, OrchestratorBuilder, OrchestratorConfig, TwoStageOrchestrator,
};
pub use state::PipelineState;
pub use stats::ProcessingStats;
