use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ExtractionError;
use crate::model::Job;

/// Fields returned by a [`StructuredExtractor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub confidence: f64,
}

/// Structured-data extraction for Stage 1.
///
/// Implementations are called from blocking worker threads and must not await.
pub trait StructuredExtractor: Send + Sync {
    fn extract(&self, job: &Job) -> Result<ExtractedFields, ExtractionError>;
}

static SALARY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d[\d,.]*\s?k?(?:\s?(?:-|–|to)\s?[$€£]?\s?\d[\d,.]*\s?k?)?(?:\s?(?:per|/)\s?(?:year|yr|hour|hr|annum))?",
    )
    .ok()
});

static EMPLOYMENT: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    labelled(&[
        ("full-time", r"(?i)\bfull[\s-]?time\b"),
        ("part-time", r"(?i)\bpart[\s-]?time\b"),
        ("contract", r"(?i)\b(?:contract|freelance|contractor)\b"),
        ("internship", r"(?i)\b(?:intern|internship)\b"),
        ("temporary", r"(?i)\b(?:temporary|temp)\b"),
    ])
});

static EXPERIENCE: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    labelled(&[
        ("entry", r"(?i)\b(?:entry[\s-]level|graduate|trainee)\b"),
        ("junior", r"(?i)\b(?:junior|jr\.?)\b"),
        ("senior", r"(?i)\b(?:senior|sr\.?)\b"),
        ("lead", r"(?i)\b(?:lead|principal|staff)\b"),
    ])
});

fn labelled(table: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|re| (*label, re)))
        .collect()
}

/// Regex/keyword extractor used when no richer extractor is wired in.
///
/// Only fills what can be read cheaply: salary ranges, employment type and a coarse
/// experience level taken from the title.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl StructuredExtractor for HeuristicExtractor {
    fn extract(&self, job: &Job) -> Result<ExtractedFields, ExtractionError> {
        if job.title.trim().is_empty() {
            return Err(ExtractionError::MissingField { field: "title" });
        }

        let text = job.analysis_text();

        let salary = SALARY
            .as_ref()
            .and_then(|re| re.find(&text))
            .map(|m| m.as_str().trim().to_string());
        let employment_type = EMPLOYMENT
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map(|(label, _)| label.to_string());
        let experience_level = EXPERIENCE
            .iter()
            .find(|(_, re)| re.is_match(&job.title))
            .map(|(label, _)| label.to_string());

        let found = [
            salary.is_some(),
            employment_type.is_some(),
            experience_level.is_some(),
            !job.location.is_empty(),
        ]
        .iter()
        .filter(|f| **f)
        .count();

        Ok(ExtractedFields {
            title: job.title.trim().to_string(),
            company: job.company.trim().to_string(),
            location: job.location.trim().to_string(),
            salary,
            experience_level,
            employment_type,
            skills: Vec::new(),
            requirements: Vec::new(),
            benefits: Vec::new(),
            confidence: 0.5 + 0.1 * found as f64,
        })
    }
}
