use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::config::Stage1Config;
use super::error::FilterError;
use super::patterns;
use crate::enrichment::lexicon::skill_pattern;
use crate::external::{ExtractedFields, ExtractionError, StructuredExtractor};
use crate::model::{CandidateProfile, Job, Stage1Result};

struct FilterInner {
    extractor: Arc<dyn StructuredExtractor>,
    profile: Arc<CandidateProfile>,
    skills: Vec<(String, Regex)>,
    title_keywords: Vec<Regex>,
    config: Stage1Config,
}

/// Stage-1 fast filter: cheap extraction, heuristic score and pass/fail gating.
///
/// Cheap to clone; clones share the compiled profile patterns.
#[derive(Clone)]
pub struct FastFilter {
    inner: Arc<FilterInner>,
}

impl std::fmt::Debug for FastFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastFilter")
            .field("skills", &self.inner.skills.len())
            .field("title_keywords", &self.inner.title_keywords.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn compile_terms(terms: &[String]) -> Result<Vec<(String, Regex)>, FilterError> {
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|term| {
            skill_pattern(term)
                .map(|re| (term.trim().to_string(), re))
                .map_err(|e| FilterError::InvalidPattern {
                    term: term.clone(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

impl FastFilter {
    pub fn new(
        profile: Arc<CandidateProfile>,
        extractor: Arc<dyn StructuredExtractor>,
        config: Stage1Config,
    ) -> Result<Self, FilterError> {
        config.validate()?;

        let mut skills = compile_terms(&profile.skills)?;
        let mut seen = std::collections::HashSet::new();
        skills.retain(|(name, _)| seen.insert(name.to_lowercase()));

        let title_keywords = compile_terms(&profile.title_keywords)?
            .into_iter()
            .map(|(_, re)| re)
            .collect();

        Ok(Self {
            inner: Arc::new(FilterInner {
                extractor,
                profile,
                skills,
                title_keywords,
                config,
            }),
        })
    }

    pub fn config(&self) -> &Stage1Config {
        &self.inner.config
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.inner.profile
    }

    pub fn worker_id(&self, idx: usize) -> String {
        format!("stage1-worker-{}", idx % self.inner.config.cpu_workers.max(1))
    }

    /// Evaluates one job. Never fails: extractor errors and panics yield a
    /// filtered-out, zero-confidence result.
    pub fn evaluate(&self, job: &Job, worker_id: &str) -> Stage1Result {
        let started = Instant::now();
        let extractor = &self.inner.extractor;

        let extracted = catch_unwind(AssertUnwindSafe(|| extractor.extract(job)))
            .unwrap_or_else(|payload| {
                Err(ExtractionError::Panicked {
                    reason: panic_message(payload.as_ref()),
                })
            });

        match extracted {
            Ok(fields) => self.score(job, fields, worker_id, started),
            Err(e) => {
                warn!(job_id = %job.id, worker_id, error = %e, "Stage-1 extraction failed");
                Stage1Result::extraction_failed(job, e.to_string(), worker_id, started.elapsed())
            }
        }
    }

    fn score(
        &self,
        job: &Job,
        fields: ExtractedFields,
        worker_id: &str,
        started: Instant,
    ) -> Stage1Result {
        let weights = &self.inner.config.weights;
        let text = job.analysis_text();

        let basic_skills: Vec<String> = self
            .inner
            .skills
            .iter()
            .filter(|(name, re)| {
                re.is_match(&text) || fields.skills.iter().any(|s| s.eq_ignore_ascii_case(name))
            })
            .map(|(name, _)| name.clone())
            .collect();

        let skill_ratio = if self.inner.skills.is_empty() {
            0.0
        } else {
            basic_skills.len() as f64 / self.inner.skills.len() as f64
        };

        let title_hits = self
            .inner
            .title_keywords
            .iter()
            .filter(|re| re.is_match(&job.title))
            .count();
        let title_bonus = (title_hits as f64 * weights.title_keyword_bonus).min(weights.title_bonus_cap);
        let company_bonus = if patterns::is_tech_company(&job.company) {
            weights.tech_company_bonus
        } else {
            0.0
        };

        let basic_compatibility = round_score(
            skill_ratio * weights.skill_weight + weights.base_score + title_bonus + company_bonus,
        )
        .min(weights.max_score);

        let is_non_target_language = patterns::required_languages(&text)
            .into_iter()
            .any(|lang| !self.inner.profile.speaks(lang));

        let required_experience_years = patterns::required_years(&job.description);
        let is_senior_role = patterns::is_senior_title(&job.title)
            || required_experience_years.is_some_and(|y| y >= weights.senior_min_years);

        let mut passes_filter = !is_non_target_language
            && basic_compatibility > weights.min_score
            && (!basic_skills.is_empty() || basic_compatibility > weights.no_skill_min_score);
        if passes_filter && is_senior_role {
            passes_filter = basic_compatibility > weights.senior_override_floor
                && patterns::has_entry_friendly_terms(&text);
        }

        debug!(
            job_id = %job.id,
            worker_id,
            skills = basic_skills.len(),
            basic_compatibility,
            passes_filter,
            "Stage-1 scored"
        );

        Stage1Result {
            job_id: job.id.clone(),
            title: non_empty_or(fields.title, &job.title),
            company: non_empty_or(fields.company, &job.company),
            location: non_empty_or(fields.location, &job.location),
            salary: fields.salary,
            experience_level: fields.experience_level,
            employment_type: fields.employment_type,
            remote_category: patterns::remote_category(&format!("{}\n{}", job.location, text)),
            required_experience_years,
            education: patterns::education(&job.description),
            industry: patterns::industry(&format!("{}\n{}", job.company, job.description)),
            basic_skills,
            basic_compatibility,
            is_non_target_language,
            is_senior_role,
            passes_filter,
            confidence: fields.confidence.clamp(0.0, 1.0),
            processing_time: started.elapsed(),
            worker_id: worker_id.to_string(),
            extraction_error: None,
        }
    }

    /// Evaluates every job on the blocking pool; output order matches input order.
    pub async fn process_batch(&self, jobs: &[Arc<Job>]) -> Vec<Stage1Result> {
        let workers = self.inner.config.cpu_workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        debug!(jobs = jobs.len(), workers, "Stage-1 batch started");

        for (idx, job) in jobs.iter().enumerate() {
            let filter = self.clone();
            let job = Arc::clone(job);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let worker_id = filter.worker_id(idx);
                let result =
                    tokio::task::spawn_blocking(move || filter.evaluate(&job, &worker_id)).await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Stage1Result>> = vec![None; jobs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(result))) => slots[idx] = Some(result),
                Ok((idx, Err(e))) => {
                    warn!(job_index = idx, error = %e, "Stage-1 worker failed");
                }
                Err(e) => warn!(error = %e, "Stage-1 task failed"),
            }
        }

        // No job may be dropped: any empty slot becomes an explicit failure.
        slots
            .into_iter()
            .zip(jobs)
            .enumerate()
            .map(|(idx, (slot, job))| {
                slot.unwrap_or_else(|| {
                    Stage1Result::extraction_failed(
                        job,
                        "stage-1 worker did not return a result",
                        self.worker_id(idx),
                        std::time::Duration::ZERO,
                    )
                })
            })
            .collect()
    }
}

/// Snaps float drift so sums such as `1/6 * 0.6 + 0.3` land exactly on `0.4`.
fn round_score(score: f64) -> f64 {
    (score * 1e9).round() / 1e9
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
