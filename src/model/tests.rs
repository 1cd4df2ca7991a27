use std::time::Duration;

use super::*;

#[test]
fn test_recommendation_exact_boundaries() {
    assert_eq!(Recommendation::from_score(0.70), Recommendation::Apply);
    assert_eq!(Recommendation::from_score(0.6999), Recommendation::Review);
    assert_eq!(Recommendation::from_score(0.40), Recommendation::Review);
    assert_eq!(Recommendation::from_score(0.3999), Recommendation::Skip);
    assert_eq!(Recommendation::from_score(0.0), Recommendation::Skip);
    assert_eq!(Recommendation::from_score(1.0), Recommendation::Apply);
}

#[test]
fn test_recommendation_display() {
    assert_eq!(Recommendation::Apply.to_string(), "apply");
    assert_eq!(Recommendation::Review.to_string(), "review");
    assert_eq!(Recommendation::Skip.to_string(), "skip");
}

#[test]
fn test_sentiment_from_label() {
    assert_eq!(Sentiment::from_label("POSITIVE"), Sentiment::Positive);
    assert_eq!(Sentiment::from_label(" negative "), Sentiment::Negative);
    assert_eq!(Sentiment::from_label("mixed"), Sentiment::Neutral);
    assert_eq!(Sentiment::from_label(""), Sentiment::Neutral);
}

#[test]
fn test_job_builder_defaults_to_scraped() {
    let job = Job::new("j1", "Data Analyst")
        .with_company("Acme")
        .with_description("SQL and Python");
    assert_eq!(job.status, status::SCRAPED);
    assert_eq!(job.analysis_text(), "Data Analyst\nSQL and Python");
}

#[test]
fn test_job_deserializes_with_missing_optional_fields() {
    let job: Job = serde_json::from_str(r#"{"id":"7","title":"Engineer"}"#).unwrap();
    assert_eq!(job.id, "7");
    assert!(job.description.is_empty());
    assert!(job.status.is_empty());
}

#[test]
fn test_profile_speaks_is_case_insensitive() {
    let profile = CandidateProfile::new(["Rust"]).with_languages(["English", "German"]);
    assert!(profile.speaks("german"));
    assert!(!profile.speaks("french"));
}

#[test]
fn test_profile_default_language_is_english() {
    let profile: CandidateProfile = serde_json::from_str(r#"{"skills":["Go"]}"#).unwrap();
    assert!(profile.speaks("english"));
}

#[test]
fn test_profile_query_text() {
    let profile = CandidateProfile::new(["Python", "SQL"]).with_title_keywords(["analyst"]);
    assert_eq!(profile.query_text(), "analyst\nSkills: Python, SQL");
}

#[test]
fn test_extraction_failed_result_is_filtered_out() {
    let job = Job::new("j9", "Backend Engineer").with_company("Initech");
    let result =
        Stage1Result::extraction_failed(&job, "boom", "stage1-worker-0", Duration::ZERO);

    assert!(!result.passes_filter);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.title, "Backend Engineer");
    assert_eq!(result.company, "Initech");
    assert_eq!(result.extraction_error.as_deref(), Some("boom"));
}

#[test]
fn test_derived_requirements() {
    let job = Job::new("j1", "x");
    let mut result = Stage1Result::extraction_failed(&job, "n/a", "w", Duration::ZERO);
    result.required_experience_years = Some(3);
    result.education = EducationLevel::Master;
    assert_eq!(
        result.derived_requirements(),
        vec!["3+ years of experience".to_string(), "Master's degree".to_string()]
    );
}

#[test]
fn test_skip_reason_notes_mention_enrichment() {
    assert!(
        Stage2SkipReason::BackendUnavailable
            .note()
            .contains("stage 2 skipped")
    );
    assert!(Stage2SkipReason::FilteredOut.note().starts_with("not enriched"));
}
