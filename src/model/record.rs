use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::{Job, status};
use super::results::{Recommendation, Sentiment, TwoStageResult};

/// Job record written back to the store by the process-pool variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedJobRecord {
    /// The job with its lifecycle status moved to `processed` or `processing_error`.
    pub job: Job,
    pub compatibility: f64,
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub recommendation: Recommendation,
    pub sentiment: Option<Sentiment>,
    pub stages_completed: u8,
    pub used_fallback: bool,
    pub error: Option<String>,
    pub worker_id: String,
    pub elapsed: Duration,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedJobRecord {
    pub fn from_result(result: &TwoStageResult, worker_id: &str, elapsed: Duration) -> Self {
        let mut job = (*result.job).clone();
        job.status = status::PROCESSED.to_string();

        let (benefits, sentiment, used_fallback) = match &result.stage2 {
            Some(s2) => (
                s2.extracted_benefits.clone(),
                Some(s2.sentiment),
                s2.is_fallback,
            ),
            None => (Vec::new(), None, false),
        };

        Self {
            job,
            compatibility: result.final_compatibility,
            skills: result.final_skills.clone(),
            requirements: result.final_requirements.clone(),
            benefits,
            recommendation: result.recommendation,
            sentiment,
            stages_completed: result.stages_completed,
            used_fallback,
            error: None,
            worker_id: worker_id.to_string(),
            elapsed,
            processed_at: Utc::now(),
        }
    }

    /// Explicit error record: zero score, no skills, fallback flag set.
    pub fn processing_error(
        job: &Job,
        error: impl Into<String>,
        worker_id: &str,
        elapsed: Duration,
    ) -> Self {
        let mut job = job.clone();
        job.status = status::PROCESSING_ERROR.to_string();

        Self {
            job,
            compatibility: 0.0,
            skills: Vec::new(),
            requirements: Vec::new(),
            benefits: Vec::new(),
            recommendation: Recommendation::Skip,
            sentiment: None,
            stages_completed: 0,
            used_fallback: true,
            error: Some(error.into()),
            worker_id: worker_id.to_string(),
            elapsed,
            processed_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
