use std::sync::Arc;

use super::*;
use crate::external::{FailingExtractor, HeuristicExtractor, StructuredExtractor};
use crate::model::{CandidateProfile, EducationLevel, Job, RemoteCategory};

fn filter_with(profile: CandidateProfile, extractor: Arc<dyn StructuredExtractor>) -> FastFilter {
    FastFilter::new(Arc::new(profile), extractor, Stage1Config::default()).unwrap()
}

fn python_filter() -> FastFilter {
    filter_with(
        CandidateProfile::new(["Python"]),
        Arc::new(HeuristicExtractor::new()),
    )
}

fn job(id: &str, title: &str, description: &str) -> Job {
    Job::new(id, title)
        .with_company("Acme Corp")
        .with_description(description)
}

#[test]
fn test_score_formula_with_skill_match() {
    let result = python_filter().evaluate(&job("a", "Developer", "We write Python daily."), "w0");
    // 1/1 * 0.6 + 0.3
    assert!((result.basic_compatibility - 0.9).abs() < 1e-9);
    assert_eq!(result.basic_skills, vec!["Python"]);
    assert!(result.passes_filter);
    assert_eq!(result.worker_id, "w0");
    assert!(result.extraction_error.is_none());
}

#[test]
fn test_one_of_six_skills_lands_on_review_boundary() {
    let filter = filter_with(
        CandidateProfile::new(["Python", "SQL", "Docker", "Kubernetes", "Terraform", "Rust"]),
        Arc::new(HeuristicExtractor::new()),
    );
    let result = filter.evaluate(&job("r", "Developer", "We write Python daily."), "w0");

    assert_eq!(result.basic_compatibility, 0.4);
    assert_eq!(
        crate::model::Recommendation::from_score(result.basic_compatibility),
        crate::model::Recommendation::Review
    );
}

#[test]
fn test_no_skill_job_scores_base_and_passes() {
    let result = python_filter().evaluate(&job("b", "Developer", "Java and Go."), "w0");
    assert!((result.basic_compatibility - 0.3).abs() < 1e-9);
    assert!(result.basic_skills.is_empty());
    assert!(result.passes_filter);
}

#[test]
fn test_bonuses_and_cap() {
    let profile = CandidateProfile::new(["Python", "SQL"])
        .with_title_keywords(["data", "engineer", "analytics"]);
    let filter = filter_with(profile, Arc::new(HeuristicExtractor::new()));

    let job = Job::new("c", "Data Engineer, Analytics")
        .with_company("Nimbus Software")
        .with_description("Python and SQL");
    let result = filter.evaluate(&job, "w0");
    // 0.6 + 0.3 + min(0.3, 0.2) + 0.05 = 1.15 → capped
    assert!((result.basic_compatibility - 0.95).abs() < 1e-9);

    let half = Job::new("d", "Engineer").with_description("Only SQL here");
    let result = filter.evaluate(&half, "w0");
    // 0.5 * 0.6 + 0.3 + 0.1
    assert!((result.basic_compatibility - 0.7).abs() < 1e-9);
}

#[test]
fn test_configurable_weights() {
    let weights = Stage1Weights {
        title_keyword_bonus: 0.0,
        tech_company_bonus: 0.0,
        ..Default::default()
    };
    let filter = FastFilter::new(
        Arc::new(CandidateProfile::new(["Python"]).with_title_keywords(["engineer"])),
        Arc::new(HeuristicExtractor::new()),
        Stage1Config::default().with_weights(weights),
    )
    .unwrap();

    let job = Job::new("e", "Engineer").with_company("Data Labs");
    assert!((filter.evaluate(&job, "w0").basic_compatibility - 0.3).abs() < 1e-9);
}

#[test]
fn test_skill_match_is_case_insensitive_and_bounded() {
    let filter = filter_with(
        CandidateProfile::new(["Java", "java", "C++"]),
        Arc::new(HeuristicExtractor::new()),
    );
    let result = filter.evaluate(&job("f", "Dev", "JAVASCRIPT and c++"), "w0");
    assert_eq!(result.basic_skills, vec!["C++"]);
}

#[test]
fn test_non_target_language_is_disqualified() {
    let filter = python_filter();
    let german = job("g", "Entwickler", "Python. Fließend Deutsch ist erforderlich.");
    let result = filter.evaluate(&german, "w0");
    assert!(result.is_non_target_language);
    assert!(!result.passes_filter);

    let speaker = filter_with(
        CandidateProfile::new(["Python"]).with_languages(["English", "German"]),
        Arc::new(HeuristicExtractor::new()),
    );
    let result = speaker.evaluate(&german, "w0");
    assert!(!result.is_non_target_language);
    assert!(result.passes_filter);
}

#[test]
fn test_senior_roles_need_entry_friendly_override() {
    let filter = python_filter();

    let senior = filter.evaluate(&job("h", "Senior Python Engineer", "Python"), "w0");
    assert!(senior.is_senior_role);
    assert!(!senior.passes_filter);

    let friendly = filter.evaluate(
        &job("i", "Senior Analyst", "Python, open to associate level"),
        "w0",
    );
    assert!(friendly.is_senior_role);
    assert!(friendly.passes_filter);

    // Entry-friendly wording alone is not enough below the floor.
    let weak = filter.evaluate(&job("j", "Lead Analyst", "Excel"), "w0");
    assert!(weak.is_senior_role);
    assert!(!weak.passes_filter);
}

#[test]
fn test_years_of_experience_mark_seniority() {
    let result = python_filter().evaluate(
        &job("k", "Developer", "Python. 7+ years of experience required."),
        "w0",
    );
    assert_eq!(result.required_experience_years, Some(7));
    assert!(result.is_senior_role);
}

#[test]
fn test_derived_fields() {
    let job = Job::new("l", "Data Analyst")
        .with_company("Northwind Bank")
        .with_location("Berlin (Hybrid)")
        .with_description("Python. Master's degree preferred. 2-3 years.");
    let result = python_filter().evaluate(&job, "w0");

    assert_eq!(result.remote_category, RemoteCategory::Hybrid);
    assert_eq!(result.education, EducationLevel::Master);
    assert_eq!(result.required_experience_years, Some(2));
    assert_eq!(result.industry.as_deref(), Some("finance"));
    assert!(!result.is_senior_role);
}

#[test]
fn test_extraction_error_is_filtered_out() {
    let filter = filter_with(
        CandidateProfile::new(["Python"]),
        Arc::new(FailingExtractor::new("BROKEN")),
    );
    let result = filter.evaluate(&job("m", "Dev", "Python BROKEN"), "w3");

    assert!(!result.passes_filter);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.title, "Dev");
    assert_eq!(result.company, "Acme Corp");
    assert!(result.extraction_error.is_some());
}

#[test]
fn test_extractor_panic_is_contained() {
    let filter = filter_with(
        CandidateProfile::new(["Python"]),
        Arc::new(FailingExtractor::panicking("BOOM")),
    );
    let result = filter.evaluate(&job("n", "Dev", "BOOM"), "w0");
    assert!(!result.passes_filter);
    assert!(result.extraction_error.unwrap().contains("panicked"));
}

#[test]
fn test_invalid_config_rejected() {
    let err = FastFilter::new(
        Arc::new(CandidateProfile::default()),
        Arc::new(HeuristicExtractor::new()),
        Stage1Config::default().with_cpu_workers(0),
    )
    .unwrap_err();
    assert!(matches!(err, FilterError::InvalidConfig { .. }));

    let weights = Stage1Weights {
        base_score: 1.5,
        ..Default::default()
    };
    assert!(weights.validate().is_err());
}

#[tokio::test]
async fn test_process_batch_preserves_order_and_count() {
    let filter = filter_with(
        CandidateProfile::new(["Python"]),
        Arc::new(FailingExtractor::panicking("BOOM")),
    );
    let jobs: Vec<Arc<Job>> = (0..25)
        .map(|i| {
            let description = match i % 5 {
                0 => "Python",
                3 => "BOOM",
                _ => "Rust",
            };
            Arc::new(job(&format!("job-{i}"), "Developer", description))
        })
        .collect();

    let results = filter.process_batch(&jobs).await;

    assert_eq!(results.len(), jobs.len());
    for (i, (result, job)) in results.iter().zip(&jobs).enumerate() {
        assert_eq!(result.job_id, job.id);
        assert_eq!(result.worker_id, format!("stage1-worker-{}", i % 10));
        assert_eq!(result.extraction_error.is_some(), i % 5 == 3);
    }
}

#[tokio::test]
async fn test_process_batch_empty() {
    assert!(python_filter().process_batch(&[]).await.is_empty());
}
