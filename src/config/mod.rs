//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `JOBSIFT_*` environment variables; library
//! components take explicit config values, so `from_env` is only a convenience for binaries.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    BATCH_ROUTE_MIN_BATCHES, DEFAULT_CPU_WORKERS, DEFAULT_GROUP_SIZE, DEFAULT_POOL_WORKERS,
};
use crate::pipeline::OrchestratorConfig;
use crate::pool::PoolConfig;
use crate::stage1::Stage1Config;
use crate::threshold::Preferences;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Stage-1 worker pool size. Default: `10`.
    pub cpu_workers: usize,

    /// 0.0 favours quality, 1.0 favours speed. Default: `0.5`.
    pub speed_bias: f64,

    /// Sentence-encoder model directory; rule-based enrichment when unset.
    pub model_path: Option<PathBuf>,

    /// Master switch for Stage 2. Default: `true`.
    pub stage2_enabled: bool,

    /// Process-pool size. Default: `2`.
    pub pool_workers: usize,

    /// Jobs per process-pool group. Default: `5`.
    pub group_size: usize,

    /// Overrides the tier-derived Stage-2 concurrency.
    pub max_concurrency: Option<usize>,

    /// Worker binary for the subprocess launcher.
    pub worker_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_workers: DEFAULT_CPU_WORKERS,
            speed_bias: 0.5,
            model_path: None,
            stage2_enabled: true,
            pool_workers: DEFAULT_POOL_WORKERS,
            group_size: DEFAULT_GROUP_SIZE,
            max_concurrency: None,
            worker_path: None,
        }
    }
}

impl Config {
    pub const ENV_CPU_WORKERS: &'static str = "JOBSIFT_CPU_WORKERS";
    pub const ENV_SPEED_BIAS: &'static str = "JOBSIFT_SPEED_BIAS";
    pub const ENV_MODEL_PATH: &'static str = "JOBSIFT_MODEL_PATH";
    pub const ENV_STAGE2_ENABLED: &'static str = "JOBSIFT_STAGE2_ENABLED";
    pub const ENV_POOL_WORKERS: &'static str = "JOBSIFT_POOL_WORKERS";
    pub const ENV_GROUP_SIZE: &'static str = "JOBSIFT_GROUP_SIZE";
    pub const ENV_MAX_CONCURRENCY: &'static str = "JOBSIFT_MAX_CONCURRENCY";
    pub const ENV_WORKER_PATH: &'static str = "JOBSIFT_WORKER_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            cpu_workers: Self::parse_int_from_env(Self::ENV_CPU_WORKERS)?
                .unwrap_or(defaults.cpu_workers),
            speed_bias: Self::parse_float_from_env(Self::ENV_SPEED_BIAS)?
                .unwrap_or(defaults.speed_bias),
            model_path: Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH),
            stage2_enabled: Self::parse_bool_from_env(Self::ENV_STAGE2_ENABLED)?
                .unwrap_or(defaults.stage2_enabled),
            pool_workers: Self::parse_int_from_env(Self::ENV_POOL_WORKERS)?
                .unwrap_or(defaults.pool_workers),
            group_size: Self::parse_int_from_env(Self::ENV_GROUP_SIZE)?
                .unwrap_or(defaults.group_size),
            max_concurrency: Self::parse_int_from_env(Self::ENV_MAX_CONCURRENCY)?,
            worker_path: Self::parse_optional_path_from_env(Self::ENV_WORKER_PATH),
        })
    }

    /// Validates ranges and paths (does not load the model).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (Self::ENV_CPU_WORKERS, self.cpu_workers),
            (Self::ENV_POOL_WORKERS, self.pool_workers),
            (Self::ENV_GROUP_SIZE, self.group_size),
        ] {
            if value == 0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if self.max_concurrency == Some(0) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.speed_bias) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SPEED_BIAS,
                reason: format!("{} is outside [0.0, 1.0]", self.speed_bias),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.worker_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.speed_bias)
    }

    pub fn stage1_config(&self) -> Stage1Config {
        Stage1Config::default().with_cpu_workers(self.cpu_workers)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            preferences: self.preferences(),
            stage2_enabled: self.stage2_enabled,
            max_concurrency: self.max_concurrency,
            batch_route_min_batches: BATCH_ROUTE_MIN_BATCHES,
            stage2_deadline: None,
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.pool_workers,
            group_size: self.group_size,
            ..PoolConfig::default()
        }
    }

    fn parse_int_from_env<T>(name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match Self::read(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|source| ConfigError::InvalidInteger { name, value, source }),
            None => Ok(None),
        }
    }

    fn parse_float_from_env(name: &'static str) -> Result<Option<f64>, ConfigError> {
        match Self::read(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|source| ConfigError::InvalidFloat { name, value, source }),
            None => Ok(None),
        }
    }

    fn parse_bool_from_env(name: &'static str) -> Result<Option<bool>, ConfigError> {
        match Self::read(name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            None => Ok(None),
        }
    }

    fn parse_optional_path_from_env(name: &str) -> Option<PathBuf> {
        Self::read(name).map(PathBuf::from)
    }

    fn read(name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
