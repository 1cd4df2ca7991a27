use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::chain::StrategyChain;
use super::strategy::{JobWithStage1, StrategyKind, rule_based};
use crate::model::Stage2Result;

/// Result of running [`BatchProcessor::process`].
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One slot per input; `None` only when the deadline expired first.
    pub results: Vec<Option<Stage2Result>>,
    /// Strategy that produced each processed batch, in batch order.
    pub strategy_used: Vec<StrategyKind>,
    /// Batches that needed at least one fallback step.
    pub fallback_batches: usize,
    pub deadline_expired: bool,
}

impl BatchOutcome {
    pub fn batches(&self) -> usize {
        self.strategy_used.len()
    }

    pub fn enriched(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }
}

/// Splits Stage-2 work into hardware-sized batches and walks the strategy chain per batch.
///
/// A batch that fails on one strategy is retried on the next one; other batches are
/// unaffected.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    chain: Arc<StrategyChain>,
    batch_size: usize,
}

impl BatchProcessor {
    pub fn new(chain: Arc<StrategyChain>, batch_size: usize) -> Self {
        Self {
            chain,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, jobs: usize) -> usize {
        jobs.div_ceil(self.batch_size)
    }

    /// Processes every input, stopping early (with partial results) at `deadline`.
    pub async fn process(
        &self,
        inputs: &[JobWithStage1],
        deadline: Option<Instant>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            results: vec![None; inputs.len()],
            ..Default::default()
        };

        for (batch_idx, batch) in inputs.chunks(self.batch_size).enumerate() {
            let offset = batch_idx * self.batch_size;

            let run = self.run_chain(batch);
            let processed = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, run).await {
                    Ok(processed) => processed,
                    Err(_) => {
                        warn!(
                            batch = batch_idx,
                            remaining = inputs.len() - offset,
                            "Stage-2 deadline expired, keeping partial results"
                        );
                        outcome.deadline_expired = true;
                        break;
                    }
                },
                None => run.await,
            };

            let (results, kind, fell_back) = processed;
            if fell_back {
                outcome.fallback_batches += 1;
            }
            outcome.strategy_used.push(kind);
            for (i, result) in results.into_iter().enumerate() {
                outcome.results[offset + i] = Some(result);
            }
        }

        outcome
    }

    /// Runs one batch down the chain; returns the results, the strategy that produced
    /// them, and whether an earlier strategy failed.
    pub async fn run_chain(&self, batch: &[JobWithStage1]) -> (Vec<Stage2Result>, StrategyKind, bool) {
        let mut fell_back = false;

        for strategy in self.chain.strategies() {
            match strategy.process_batch(batch).await {
                Ok(results) if results.len() == batch.len() => {
                    debug!(
                        strategy = strategy.name(),
                        jobs = batch.len(),
                        "Batch enriched"
                    );
                    return (results, strategy.kind(), fell_back);
                }
                Ok(results) => {
                    warn!(
                        strategy = strategy.name(),
                        expected = batch.len(),
                        got = results.len(),
                        "Strategy returned wrong number of results, falling back"
                    );
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Batch failed, falling back");
                }
            }
            fell_back = true;
        }

        (
            batch.iter().map(rule_based).collect(),
            StrategyKind::RuleBased,
            true,
        )
    }
}
