//! Stage-2 batch processing over real Stage-1 output.

mod common;

use std::sync::Arc;

use jobsift::enrichment::{JobWithStage1, SemanticEnricher, StrategyKind};
use jobsift::external::HeuristicExtractor;
use jobsift::model::Job;
use jobsift::stage1::{FastFilter, Stage1Config};
use jobsift::MockInferenceClient;

use common::fixtures::{data_profile, python_job};

async fn stage1_inputs(jobs: Vec<Job>) -> Vec<JobWithStage1> {
    let filter = FastFilter::new(
        data_profile(),
        Arc::new(HeuristicExtractor::new()),
        Stage1Config::default(),
    )
    .unwrap();
    let jobs: Vec<Arc<Job>> = jobs.into_iter().map(Arc::new).collect();
    let results = filter.process_batch(&jobs).await;

    jobs.into_iter()
        .zip(results)
        .map(|(job, s1)| JobWithStage1::new(job, Arc::new(s1)))
        .collect()
}

fn eight_jobs(fail_at: Option<usize>) -> Vec<Job> {
    (0..8)
        .map(|i| {
            let job = python_job(&format!("py-{i}"));
            if Some(i) == fail_at {
                let description = format!("{} FAIL", job.description);
                job.with_description(description)
            } else {
                job
            }
        })
        .collect()
}

#[tokio::test]
async fn test_one_failing_batch_leaves_siblings_untouched() {
    let clean_inputs = stage1_inputs(eight_jobs(None)).await;
    let faulty_inputs = stage1_inputs(eight_jobs(Some(5))).await;

    let clean = SemanticEnricher::initialize(
        Arc::new(MockInferenceClient::accelerated()),
        data_profile(),
        2,
    )
    .unwrap()
    .process_batch(&clean_inputs, 2, None)
    .await;

    let faulty = SemanticEnricher::initialize(
        Arc::new(MockInferenceClient::accelerated().with_fail_marker("FAIL")),
        data_profile(),
        2,
    )
    .unwrap()
    .process_batch(&faulty_inputs, 2, None)
    .await;

    assert_eq!(faulty.batches(), 4);
    assert_eq!(faulty.fallback_batches, 1);
    assert_eq!(
        faulty.strategy_used,
        vec![
            StrategyKind::AcceleratedBatched,
            StrategyKind::AcceleratedBatched,
            StrategyKind::RuleBased,
            StrategyKind::AcceleratedBatched,
        ]
    );

    for (i, (a, b)) in clean.results.iter().zip(&faulty.results).enumerate() {
        let a = a.as_ref().unwrap();
        let b = b.as_ref().unwrap();
        if i / 2 == 2 {
            assert!(b.is_fallback, "job {i}");
        } else {
            assert!(!b.is_fallback, "job {i}");
            assert!(a.same_content(b), "job {i}: {a:?} vs {b:?}");
        }
    }
}

#[tokio::test]
async fn test_batched_matches_individual_for_filtered_jobs() {
    let inputs = stage1_inputs(eight_jobs(None)).await;
    let enricher = SemanticEnricher::initialize(
        Arc::new(MockInferenceClient::accelerated()),
        data_profile(),
        2,
    )
    .unwrap();

    let batched = enricher.process_batch(&inputs, 4, None).await;

    for (input, batched) in inputs.iter().zip(&batched.results) {
        let individual = enricher.enrich(input).await;
        assert!(batched.as_ref().unwrap().same_content(&individual));
    }
}
