use serde::{Deserialize, Serialize};

use super::error::FilterError;
use crate::constants::{DEFAULT_CPU_WORKERS, MAX_HEURISTIC_SCORE};

/// Heuristic weights of the Stage-1 score.
///
/// The bonuses are uncalibrated defaults; keep them configurable and revisit them
/// against real application outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage1Weights {
    /// Multiplier for the fraction of profile skills found.
    pub skill_weight: f64,
    /// Score every job starts from.
    pub base_score: f64,
    /// Added per title keyword hit.
    pub title_keyword_bonus: f64,
    /// Ceiling for the summed title bonus.
    pub title_bonus_cap: f64,
    /// Added when the company name looks like a tech company.
    pub tech_company_bonus: f64,
    /// Senior roles pass only above this score (and with entry-friendly wording).
    pub senior_override_floor: f64,
    /// Required years at or above which a role counts as senior.
    pub senior_min_years: u32,
    /// Every passing job must score above this.
    pub min_score: f64,
    /// Jobs without any skill match must score above this.
    pub no_skill_min_score: f64,
    pub max_score: f64,
}

impl Default for Stage1Weights {
    fn default() -> Self {
        Self {
            skill_weight: 0.6,
            base_score: 0.3,
            title_keyword_bonus: 0.1,
            title_bonus_cap: 0.2,
            tech_company_bonus: 0.05,
            senior_override_floor: 0.4,
            senior_min_years: 5,
            min_score: 0.15,
            no_skill_min_score: 0.25,
            max_score: MAX_HEURISTIC_SCORE,
        }
    }
}

impl Stage1Weights {
    pub fn validate(&self) -> Result<(), FilterError> {
        let unit = [
            ("skill_weight", self.skill_weight),
            ("base_score", self.base_score),
            ("title_keyword_bonus", self.title_keyword_bonus),
            ("title_bonus_cap", self.title_bonus_cap),
            ("tech_company_bonus", self.tech_company_bonus),
            ("senior_override_floor", self.senior_override_floor),
            ("min_score", self.min_score),
            ("no_skill_min_score", self.no_skill_min_score),
            ("max_score", self.max_score),
        ];

        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(FilterError::InvalidConfig {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Stage-1 settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage1Config {
    /// Size of the blocking worker pool.
    pub cpu_workers: usize,
    pub weights: Stage1Weights,
}

impl Default for Stage1Config {
    fn default() -> Self {
        Self {
            cpu_workers: DEFAULT_CPU_WORKERS,
            weights: Stage1Weights::default(),
        }
    }
}

impl Stage1Config {
    pub fn with_cpu_workers(mut self, cpu_workers: usize) -> Self {
        self.cpu_workers = cpu_workers;
        self
    }

    pub fn with_weights(mut self, weights: Stage1Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.cpu_workers == 0 {
            return Err(FilterError::InvalidConfig {
                reason: "cpu_workers must be at least 1".to_string(),
            });
        }
        self.weights.validate()
    }
}
