use std::sync::Arc;

use tracing::info;

use super::strategy::{
    AcceleratedBatched, BackendHandle, CpuParallel, EnrichmentStrategy, RuleBased, StrategyKind,
};
use crate::model::CandidateProfile;

/// Ordered list of enrichment strategies, chosen once from backend probing.
///
/// The last entry is always [`RuleBased`], so walking the chain always yields a result.
#[derive(Clone)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn EnrichmentStrategy>>,
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyChain")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl StrategyChain {
    /// Uses the given strategies in order, appending [`RuleBased`] if it is missing.
    pub fn new(mut strategies: Vec<Arc<dyn EnrichmentStrategy>>) -> Self {
        if strategies
            .last()
            .is_none_or(|s| s.kind() != StrategyKind::RuleBased)
        {
            strategies.push(Arc::new(RuleBased));
        }
        Self { strategies }
    }

    /// Picks the chain for a backend:
    /// accelerated → batched, parallel, rules; available → parallel, rules; otherwise rules.
    pub fn probe(
        backend: Option<&BackendHandle>,
        profile: Arc<CandidateProfile>,
        concurrency: usize,
    ) -> Self {
        let mut strategies: Vec<Arc<dyn EnrichmentStrategy>> = Vec::new();

        if let Some(backend) = backend.filter(|b| b.is_available()) {
            if backend.is_accelerated() {
                strategies.push(Arc::new(AcceleratedBatched::new(
                    backend.clone(),
                    Arc::clone(&profile),
                )));
            }
            strategies.push(Arc::new(CpuParallel::new(
                backend.clone(),
                profile,
                concurrency,
            )));
        }

        let chain = Self::new(strategies);
        info!(strategies = ?chain.kinds(), "Enrichment strategy chain selected");
        chain
    }

    /// Rule-based only.
    pub fn rules_only() -> Self {
        Self::new(Vec::new())
    }

    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// The preferred (first) strategy.
    pub fn primary(&self) -> StrategyKind {
        self.strategies
            .first()
            .map(|s| s.kind())
            .unwrap_or(StrategyKind::RuleBased)
    }

    pub fn strategies(&self) -> &[Arc<dyn EnrichmentStrategy>] {
        &self.strategies
    }
}
