use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::job::Job;
use crate::constants::{APPLY_THRESHOLD, REVIEW_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Remote-work category derived from location and description.
pub enum RemoteCategory {
    Remote,
    Hybrid,
    Onsite,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Highest education level a posting asks for.
pub enum EducationLevel {
    #[default]
    None,
    Bachelor,
    Master,
    Doctorate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// Parses a backend label; anything unrecognised is neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Sentiment::Positive,
            "negative" | "neg" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Apply,
    Review,
    Skip,
}

impl Recommendation {
    /// Classifies a final compatibility score (boundaries are inclusive).
    pub fn from_score(score: f64) -> Self {
        if score >= APPLY_THRESHOLD {
            Recommendation::Apply
        } else if score >= REVIEW_THRESHOLD {
            Recommendation::Review
        } else {
            Recommendation::Skip
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Apply => "apply",
            Recommendation::Review => "review",
            Recommendation::Skip => "skip",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the fast filter for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage1Result {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub remote_category: RemoteCategory,
    pub required_experience_years: Option<u32>,
    pub education: EducationLevel,
    pub industry: Option<String>,
    /// Profile skills found in the posting, in profile order, without duplicates.
    pub basic_skills: Vec<String>,
    pub basic_compatibility: f64,
    pub is_non_target_language: bool,
    pub is_senior_role: bool,
    pub passes_filter: bool,
    pub confidence: f64,
    pub processing_time: Duration,
    pub worker_id: String,
    /// Set when the extractor failed; the result is then filtered out.
    pub extraction_error: Option<String>,
}

impl Stage1Result {
    /// Result emitted when extraction failed: filtered out, zero confidence.
    pub fn extraction_failed(
        job: &Job,
        reason: impl Into<String>,
        worker_id: impl Into<String>,
        processing_time: Duration,
    ) -> Self {
        Self {
            job_id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: None,
            experience_level: None,
            employment_type: None,
            remote_category: RemoteCategory::Unspecified,
            required_experience_years: None,
            education: EducationLevel::None,
            industry: None,
            basic_skills: Vec::new(),
            basic_compatibility: 0.0,
            is_non_target_language: false,
            is_senior_role: false,
            passes_filter: false,
            confidence: 0.0,
            processing_time,
            worker_id: worker_id.into(),
            extraction_error: Some(reason.into()),
        }
    }

    /// Requirements Stage 1 can state on its own (experience, education).
    pub fn derived_requirements(&self) -> Vec<String> {
        let mut requirements = Vec::new();
        if let Some(years) = self.required_experience_years {
            requirements.push(format!("{years}+ years of experience"));
        }
        match self.education {
            EducationLevel::None => {}
            EducationLevel::Bachelor => requirements.push("Bachelor's degree".to_string()),
            EducationLevel::Master => requirements.push("Master's degree".to_string()),
            EducationLevel::Doctorate => requirements.push("Doctorate".to_string()),
        }
        requirements
    }
}

/// Output of semantic enrichment for one job that passed Stage 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Result {
    pub semantic_skills: Vec<String>,
    pub contextual_requirements: Vec<String>,
    pub semantic_compatibility: f64,
    pub sentiment: Sentiment,
    pub embedding: Option<Vec<f32>>,
    pub extracted_benefits: Vec<String>,
    pub culture_signal: Option<String>,
    pub processing_time: Duration,
    pub model_confidence: f64,
    /// `true` when produced by the rule-based fallback rather than a backend.
    pub is_fallback: bool,
}

impl Stage2Result {
    /// Compares everything except `processing_time`.
    pub fn same_content(&self, other: &Stage2Result) -> bool {
        self.semantic_skills == other.semantic_skills
            && self.contextual_requirements == other.contextual_requirements
            && self.semantic_compatibility == other.semantic_compatibility
            && self.sentiment == other.sentiment
            && self.embedding == other.embedding
            && self.extracted_benefits == other.extracted_benefits
            && self.culture_signal == other.culture_signal
            && self.model_confidence == other.model_confidence
            && self.is_fallback == other.is_fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why a job finished with Stage 1 only.
pub enum Stage2SkipReason {
    /// Failed the Stage-1 filter.
    FilteredOut,
    /// Passed the filter but scored below the admission threshold.
    BelowThreshold,
    /// Admission cap (`max_phase2_jobs`) was already reached.
    CapacityExceeded,
    /// The enrichment backend failed to initialise.
    BackendUnavailable,
    /// The advisor gate declined Stage 2 for this batch.
    Disabled,
    /// The Stage-2 deadline expired before this job was enriched.
    DeadlineExpired,
}

impl Stage2SkipReason {
    pub fn note(&self) -> &'static str {
        match self {
            Stage2SkipReason::FilteredOut => "not enriched: failed stage-1 filter",
            Stage2SkipReason::BelowThreshold => "not enriched: below admission threshold",
            Stage2SkipReason::CapacityExceeded => "not enriched: stage-2 capacity reached",
            Stage2SkipReason::BackendUnavailable => {
                "not enriched: enrichment backend unavailable, stage 2 skipped"
            }
            Stage2SkipReason::Disabled => "not enriched: stage 2 disabled for this batch",
            Stage2SkipReason::DeadlineExpired => "not enriched: stage-2 deadline expired",
        }
    }
}

/// Final ranked result for one input job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoStageResult {
    pub job_id: String,
    pub url: String,
    pub job: Arc<Job>,
    pub stage1: Stage1Result,
    pub stage2: Option<Stage2Result>,
    pub final_compatibility: f64,
    pub final_skills: Vec<String>,
    pub final_requirements: Vec<String>,
    pub recommendation: Recommendation,
    pub stages_completed: u8,
    pub total_processing_time: Duration,
    pub stage2_skip_reason: Option<Stage2SkipReason>,
}

impl TwoStageResult {
    pub fn is_enriched(&self) -> bool {
        self.stage2.is_some()
    }

    /// Human-readable note explaining a missing Stage 2.
    pub fn reasoning(&self) -> Option<&'static str> {
        self.stage2_skip_reason.as_ref().map(Stage2SkipReason::note)
    }
}
