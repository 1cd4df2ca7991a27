//! Stage-2 semantic enrichment.
//!
//! Three strategies sit behind [`EnrichmentStrategy`]:
//! - [`AcceleratedBatched`]: one backend pass per batch.
//! - [`CpuParallel`]: individual backend calls under a semaphore.
//! - [`RuleBased`]: keyword heuristics from [`lexicon`]; never fails.
//!
//! [`StrategyChain`] orders them once at startup; [`BatchProcessor`] walks the chain per
//! batch so a failing batch degrades without touching its neighbours.

mod batch;
mod chain;
mod enricher;
mod error;
pub mod lexicon;
mod strategy;

#[cfg(test)]
mod tests;

pub use batch::{BatchOutcome, BatchProcessor};
pub use chain::StrategyChain;
pub use enricher::SemanticEnricher;
pub use error::{EnrichmentError, EnrichmentResult};
pub use strategy::{
    AcceleratedBatched, BackendHandle, CpuParallel, EnrichmentStrategy, JobWithStage1, RuleBased,
    StrategyKind, analysis_context, rule_based, stage2_from_analysis,
};
