use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::error::PoolError;
use super::launcher::WorkerLauncher;
use super::types::{EngineSpec, PoolRunReport, WorkerRequest, WorkerResponse};
use crate::constants::{DEFAULT_EXPECTED_STATUS, DEFAULT_GROUP_SIZE, DEFAULT_POOL_WORKERS};
use crate::external::JobStore;
use crate::model::{CandidateProfile, Job, ProcessedJobRecord};
use crate::pipeline::ProcessingStats;
use crate::stage1::Stage1Config;

#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Groups in flight at once. Default: `2`.
    pub workers: usize,
    /// Jobs per group. Default: `5`.
    pub group_size: usize,
    /// Status a job must carry to be analysed. Default: `scraped`.
    pub expected_status: String,
    pub engine: EngineSpec,
    pub stage1: Stage1Config,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_POOL_WORKERS,
            group_size: DEFAULT_GROUP_SIZE,
            expected_status: DEFAULT_EXPECTED_STATUS.to_string(),
            engine: EngineSpec::default(),
            stage1: Stage1Config::default(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "workers must be at least 1".to_string(),
            });
        }
        if self.group_size == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "group_size must be at least 1".to_string(),
            });
        }
        self.stage1
            .validate()
            .map_err(|e| PoolError::InvalidConfig {
                reason: e.to_string(),
            })
    }
}

/// Fixed groups over a small pool of isolated workers.
///
/// Each group is a self-contained [`WorkerRequest`]; a worker that crashes loses only
/// its own group. All surviving records go to the store in one bulk write.
pub struct ProcessPool {
    launcher: Arc<dyn WorkerLauncher>,
    profile: CandidateProfile,
    config: PoolConfig,
}

impl std::fmt::Debug for ProcessPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessPool")
            .field("launcher", &self.launcher.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ProcessPool {
    pub fn new(
        launcher: Arc<dyn WorkerLauncher>,
        profile: CandidateProfile,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            launcher,
            profile,
            config,
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn worker_id(&self, group: usize) -> String {
        format!("pool-worker-{}", group % self.config.workers)
    }

    /// Splits `jobs` into requests of at most `group_size` jobs.
    pub fn requests(&self, jobs: &[Job]) -> Vec<WorkerRequest> {
        jobs.chunks(self.config.group_size)
            .enumerate()
            .map(|(group, chunk)| WorkerRequest {
                worker_id: self.worker_id(group),
                jobs: chunk.to_vec(),
                profile: self.profile.clone(),
                stage1: self.config.stage1.clone(),
                engine: self.config.engine.clone(),
                expected_status: self.config.expected_status.clone(),
            })
            .collect()
    }

    /// Analyses every job, writes the records back in one bulk call and reports stats.
    ///
    /// Fails only when the store rejects the bulk write.
    #[instrument(skip_all, fields(jobs = jobs.len(), launcher = self.launcher.name()))]
    pub async fn run(
        &self,
        jobs: &[Job],
        store: &dyn JobStore,
    ) -> Result<PoolRunReport, PoolError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let requests = self.requests(jobs);
        let groups = requests.len();
        let group_sizes: Vec<usize> = requests.iter().map(|r| r.jobs.len()).collect();

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = JoinSet::new();
        for (group, request) in requests.into_iter().enumerate() {
            let launcher = Arc::clone(&self.launcher);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (group, launcher.launch(request).await)
            });
        }

        let mut slots: Vec<Option<WorkerResponse>> = vec![None; groups];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((group, Ok(response))) => slots[group] = Some(response),
                Ok((group, Err(e))) => {
                    warn!(group, error = %e, "Worker group failed");
                }
                Err(e) => warn!(error = %e, "Worker group task failed"),
            }
        }

        let mut stats = ProcessingStats {
            runs: 1,
            total_jobs: jobs.len(),
            ..Default::default()
        };
        let mut records: Vec<ProcessedJobRecord> = Vec::with_capacity(jobs.len());
        for (slot, size) in slots.into_iter().zip(&group_sizes) {
            match slot {
                Some(response) => {
                    tally(&mut stats, &response.records);
                    records.extend(response.records);
                }
                None => {
                    stats.failed_groups += 1;
                    stats.failed_jobs += size;
                }
            }
        }

        let written = if records.is_empty() {
            0
        } else {
            store.apply_bulk(&records).await?
        };
        stats.record_elapsed(started.elapsed());

        info!(
            %run_id,
            groups,
            failed_groups = stats.failed_groups,
            processed = stats.processed_jobs,
            failed = stats.failed_jobs,
            written,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Process pool run finished"
        );

        Ok(PoolRunReport {
            run_id,
            records,
            written,
            stats,
        })
    }
}

fn tally(stats: &mut ProcessingStats, records: &[ProcessedJobRecord]) {
    for record in records {
        if record.is_error() {
            stats.failed_jobs += 1;
            continue;
        }
        stats.processed_jobs += 1;
        if record.stages_completed == 2 {
            stats.stage1_passed += 1;
            stats.stage2_enriched += 1;
            if record.used_fallback {
                stats.fallback_jobs += 1;
            }
        }
    }
}
