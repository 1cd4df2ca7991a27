use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::constants::RULE_BASED_CONFIDENCE;
use crate::external::MockInferenceClient;
use crate::model::{CandidateProfile, Job, Sentiment, Stage1Result};

fn profile() -> Arc<CandidateProfile> {
    Arc::new(CandidateProfile::new(["Python", "SQL"]).with_title_keywords(["engineer"]))
}

fn input(id: &str, description: &str, compatibility: f64) -> JobWithStage1 {
    let job = Job::new(id, "Data Engineer").with_description(description);
    let mut stage1 = Stage1Result::extraction_failed(&job, "unused", "w0", Duration::ZERO);
    stage1.extraction_error = None;
    stage1.passes_filter = true;
    stage1.confidence = 0.8;
    stage1.basic_compatibility = compatibility;
    stage1.basic_skills = vec!["Python".to_string()];
    JobWithStage1::new(Arc::new(job), Arc::new(stage1))
}

#[test]
fn test_rule_based_scales_and_caps_score() {
    let result = rule_based(&input("a", "Python and Docker, great team", 0.5));
    assert!((result.semantic_compatibility - 0.55).abs() < 1e-9);
    assert!(result.is_fallback);
    assert_eq!(result.model_confidence, RULE_BASED_CONFIDENCE);
    assert_eq!(result.sentiment, Sentiment::Positive);
    assert_eq!(result.semantic_skills, vec!["Python", "Docker"]);
    assert!(result.embedding.is_none());

    let capped = rule_based(&input("b", "", 0.9));
    assert!((capped.semantic_compatibility - 0.95).abs() < 1e-9);
}

#[test]
fn test_chain_selection_follows_backend_capabilities() {
    let accelerated = BackendHandle::new(Arc::new(MockInferenceClient::accelerated()));
    assert_eq!(
        StrategyChain::probe(Some(&accelerated), profile(), 2).kinds(),
        vec![
            StrategyKind::AcceleratedBatched,
            StrategyKind::CpuParallel,
            StrategyKind::RuleBased
        ]
    );

    let cpu = BackendHandle::new(Arc::new(MockInferenceClient::new()));
    assert_eq!(
        StrategyChain::probe(Some(&cpu), profile(), 2).kinds(),
        vec![StrategyKind::CpuParallel, StrategyKind::RuleBased]
    );

    let down = BackendHandle::new(Arc::new(MockInferenceClient::unavailable()));
    assert_eq!(
        StrategyChain::probe(Some(&down), profile(), 2).kinds(),
        vec![StrategyKind::RuleBased]
    );
    assert_eq!(
        StrategyChain::probe(None, profile(), 2).kinds(),
        vec![StrategyKind::RuleBased]
    );
}

#[test]
fn test_chain_new_always_ends_with_rules() {
    let chain = StrategyChain::new(Vec::new());
    assert_eq!(chain.kinds(), vec![StrategyKind::RuleBased]);
    assert_eq!(chain.primary(), StrategyKind::RuleBased);
}

#[test]
fn test_initialize_rejects_unavailable_backend() {
    let err = SemanticEnricher::initialize(
        Arc::new(MockInferenceClient::unavailable()),
        profile(),
        2,
    )
    .unwrap_err();
    assert!(matches!(err, EnrichmentError::BackendUnavailable { .. }));
}

#[tokio::test]
async fn test_batched_and_individual_paths_agree() {
    let enricher =
        SemanticEnricher::initialize(Arc::new(MockInferenceClient::accelerated()), profile(), 2)
            .unwrap();
    let inputs = vec![
        input("a", "Python and SQL, collaborative team", 0.6),
        input("b", "Kubernetes required. Health insurance.", 0.4),
        input("c", "Stressful overtime with Java", 0.3),
    ];

    let outcome = enricher.process_batch(&inputs, 3, None).await;
    assert_eq!(outcome.strategy_used, vec![StrategyKind::AcceleratedBatched]);

    for (input, batched) in inputs.iter().zip(&outcome.results) {
        let batched = batched.as_ref().unwrap();
        let individual = enricher.enrich(input).await;
        assert!(batched.same_content(&individual), "{batched:?} vs {individual:?}");
        assert!(!batched.is_fallback);
    }
}

#[tokio::test]
async fn test_failing_batch_falls_back_alone() {
    let client = Arc::new(MockInferenceClient::accelerated().with_fail_marker("FAIL"));
    let enricher = SemanticEnricher::initialize(client, profile(), 2).unwrap();
    let inputs: Vec<_> = (0..8)
        .map(|i| {
            let description = if i == 3 { "please FAIL" } else { "Python role" };
            input(&format!("j{i}"), description, 0.5)
        })
        .collect();

    let outcome = enricher.process_batch(&inputs, 2, None).await;

    assert_eq!(outcome.batches(), 4);
    assert_eq!(outcome.fallback_batches, 1);
    assert_eq!(outcome.strategy_used[1], StrategyKind::RuleBased);
    for (i, result) in outcome.results.iter().enumerate() {
        let result = result.as_ref().unwrap();
        assert_eq!(result.is_fallback, i == 2 || i == 3, "job {i}");
    }
}

#[tokio::test]
async fn test_individual_failure_falls_back_per_job() {
    let client = Arc::new(MockInferenceClient::new().with_fail_marker("FAIL"));
    let enricher = SemanticEnricher::initialize(client, profile(), 2).unwrap();

    let ok = enricher.enrich(&input("a", "Python", 0.5)).await;
    let failed = enricher.enrich(&input("b", "FAIL", 0.5)).await;

    assert!(!ok.is_fallback);
    assert!(failed.is_fallback);
    assert!((failed.semantic_compatibility - 0.55).abs() < 1e-9);
}

#[tokio::test]
async fn test_cpu_parallel_respects_concurrency() {
    let client = Arc::new(MockInferenceClient::new().with_delay(Duration::from_millis(20)));
    let strategy = CpuParallel::new(BackendHandle::new(client.clone()), profile(), 2);
    let inputs: Vec<_> = (0..6).map(|i| input(&format!("j{i}"), "Python", 0.5)).collect();

    let results = strategy.process_batch(&inputs).await.unwrap();

    assert_eq!(results.len(), 6);
    assert_eq!(client.calls(), 6);
    assert!(client.max_in_flight() <= 2);
}

#[tokio::test]
async fn test_deadline_keeps_partial_results() {
    let client = Arc::new(MockInferenceClient::new().with_delay(Duration::from_millis(300)));
    let enricher = SemanticEnricher::initialize(client, profile(), 1).unwrap();
    let inputs: Vec<_> = (0..3).map(|i| input(&format!("j{i}"), "Python", 0.5)).collect();

    let deadline = tokio::time::Instant::now() + Duration::from_millis(50);
    let outcome = enricher.process_batch(&inputs, 1, Some(deadline)).await;

    assert!(outcome.deadline_expired);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.enriched(), 0);
}

#[tokio::test]
async fn test_rules_only_enricher() {
    let enricher = SemanticEnricher::rules_only(profile());
    assert!(!enricher.has_backend());
    assert_eq!(enricher.strategies(), vec![StrategyKind::RuleBased]);

    let outcome = enricher
        .process_batch(&[input("a", "Python", 0.5)], 4, None)
        .await;
    assert_eq!(outcome.fallback_batches, 0);
    assert!(outcome.results[0].as_ref().unwrap().is_fallback);
}
