use std::sync::Arc;

use async_trait::async_trait;
use serial_test::serial;

use super::*;
use crate::external::InMemoryJobStore;
use crate::model::{CandidateProfile, Job, Recommendation, status};

fn profile() -> CandidateProfile {
    CandidateProfile::new(["Python", "SQL"]).with_title_keywords(["analyst"])
}

fn job(id: &str) -> Job {
    Job::new(id, "Data Analyst")
        .with_company("Acme Logistics")
        .with_description("Python and SQL reporting. Great team and health insurance.")
}

fn jobs(n: usize) -> Vec<Job> {
    (0..n).map(|i| job(&format!("j{i}"))).collect()
}

fn request(jobs: Vec<Job>, engine: EngineSpec) -> WorkerRequest {
    WorkerRequest {
        worker_id: "pool-worker-0".to_string(),
        jobs,
        profile: profile(),
        stage1: Default::default(),
        engine,
        expected_status: status::SCRAPED.to_string(),
    }
}

/// Fails every group whose first job id matches.
struct CrashingLauncher {
    crash_on: String,
}

#[async_trait]
impl WorkerLauncher for CrashingLauncher {
    fn name(&self) -> &str {
        "crashing"
    }

    async fn launch(&self, request: WorkerRequest) -> Result<WorkerResponse, PoolError> {
        if request.jobs.first().is_some_and(|j| j.id == self.crash_on) {
            return Err(PoolError::Crashed {
                worker_id: request.worker_id,
                reason: "simulated crash".to_string(),
            });
        }
        InProcessLauncher::new().launch(request).await
    }
}

#[test]
fn test_validate_job() {
    assert!(validate_job(&job("a"), status::SCRAPED).is_ok());
    assert!(validate_job(&Job::new("", "Analyst").with_description("x"), status::SCRAPED).is_err());
    assert!(validate_job(&Job::new("a", " ").with_description("x"), status::SCRAPED).is_err());
    assert!(validate_job(&Job::new("a", "Analyst"), status::SCRAPED).is_err());

    let err = validate_job(&job("a").with_status(status::PROCESSED), status::SCRAPED).unwrap_err();
    assert!(err.contains("expected 'scraped'"));
}

#[test]
fn test_pool_config_validation() {
    let config = PoolConfig {
        workers: 0,
        ..Default::default()
    };
    let err = ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), config).unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig { .. }));

    let config = PoolConfig {
        group_size: 0,
        ..Default::default()
    };
    assert!(ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), config).is_err());
}

#[test]
fn test_requests_split_into_groups() {
    let pool =
        ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), PoolConfig::default())
            .unwrap();
    let requests = pool.requests(&jobs(12));

    let sizes: Vec<_> = requests.iter().map(|r| r.jobs.len()).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    let workers: Vec<_> = requests.iter().map(|r| r.worker_id.as_str()).collect();
    assert_eq!(workers, vec!["pool-worker-0", "pool-worker-1", "pool-worker-0"]);
}

#[test]
fn test_request_json_shape() {
    let request = request(jobs(1), EngineSpec::Embedding { model_dir: None });
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["engine"]["kind"], "embedding");

    let back: WorkerRequest = serde_json::from_value(json).unwrap();
    assert_eq!(back.engine, EngineSpec::Embedding { model_dir: None });
}

#[tokio::test]
async fn test_analyze_group_mixes_records_and_errors() {
    let jobs = vec![
        job("ok"),
        job("done").with_status(status::PROCESSED),
        Job::new("empty", "Data Analyst"),
        Job::new("german", "Data Analyst").with_description("Python. Fluent German required."),
    ];

    let response = analyze_group(request(jobs, EngineSpec::RuleBased)).await;
    let records = &response.records;

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].job.status, status::PROCESSED);
    assert_eq!(records[0].stages_completed, 2);
    assert!(records[0].used_fallback);
    assert!(records[0].skills.contains(&"Python".to_string()));
    assert_eq!(records[0].worker_id, "pool-worker-0");

    for record in &records[1..3] {
        assert!(record.is_error());
        assert_eq!(record.job.status, status::PROCESSING_ERROR);
        assert_eq!(record.compatibility, 0.0);
        assert!(record.skills.is_empty());
        assert!(record.used_fallback);
    }

    assert!(!records[3].is_error());
    assert_eq!(records[3].stages_completed, 1);
    assert_eq!(records[3].recommendation, Recommendation::Skip);
}

#[tokio::test]
async fn test_analyze_group_with_mock_engine() {
    let response = analyze_group(request(jobs(2), EngineSpec::Mock)).await;
    assert!(response.records.iter().all(|r| !r.used_fallback));
    assert!(response.records.iter().all(|r| r.stages_completed == 2));
}

#[tokio::test]
async fn test_analyze_group_with_stub_encoder() {
    let response = analyze_group(request(jobs(1), EngineSpec::EmbeddingStub)).await;
    let record = &response.records[0];
    assert!(!record.is_error());
    assert!(!record.used_fallback);
    assert!(record.compatibility > 0.0 && record.compatibility <= 0.95);
}

#[tokio::test]
async fn test_missing_model_falls_back_to_rules() {
    let engine = EngineSpec::Embedding {
        model_dir: Some("/nonexistent/model".into()),
    };
    let response = analyze_group(request(jobs(1), engine)).await;
    assert!(response.records[0].used_fallback);
    assert!(!response.records[0].is_error());
}

#[tokio::test]
async fn test_pool_run_writes_once() {
    let pool =
        ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), PoolConfig::default())
            .unwrap();
    let store = InMemoryJobStore::new();

    let report = pool.run(&jobs(12), &store).await.unwrap();

    assert_eq!(report.records.len(), 12);
    assert_eq!(report.written, 12);
    assert_eq!(store.bulk_calls(), 1);
    assert_eq!(store.len(), 12);
    assert_eq!(report.stats.processed_jobs, 12);
    assert_eq!(report.stats.failed_groups, 0);
    assert_eq!(report.stats.stage2_enriched, 12);

    let ids: Vec<_> = report.records.iter().map(|r| r.job.id.clone()).collect();
    let expected: Vec<_> = (0..12).map(|i| format!("j{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_crashed_worker_loses_only_its_group() {
    let launcher = Arc::new(CrashingLauncher {
        crash_on: "j5".to_string(),
    });
    let pool = ProcessPool::new(launcher, profile(), PoolConfig::default()).unwrap();
    let store = InMemoryJobStore::new();

    let report = pool.run(&jobs(12), &store).await.unwrap();

    assert_eq!(report.stats.failed_groups, 1);
    assert_eq!(report.stats.failed_jobs, 5);
    assert_eq!(report.stats.processed_jobs, 7);
    assert_eq!(report.records.len(), 7);
    assert!(store.get("j5").is_none());
    assert!(store.get("j10").is_some());
}

#[tokio::test]
async fn test_store_failure_is_reported() {
    let pool =
        ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), PoolConfig::default())
            .unwrap();
    let store = InMemoryJobStore::new();
    store.set_fail_writes(true);

    let err = pool.run(&jobs(3), &store).await.unwrap_err();
    assert!(matches!(err, PoolError::Store(_)));
}

#[tokio::test]
async fn test_empty_run_skips_store() {
    let pool =
        ProcessPool::new(Arc::new(InProcessLauncher::new()), profile(), PoolConfig::default())
            .unwrap();
    let store = InMemoryJobStore::new();

    let report = pool.run(&[], &store).await.unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(store.bulk_calls(), 0);
}

#[tokio::test]
#[serial]
async fn test_subprocess_spawn_failure() {
    let launcher = SubprocessLauncher::new("/nonexistent/jobsift-worker");
    let err = launcher
        .launch(request(jobs(1), EngineSpec::RuleBased))
        .await
        .unwrap_err();
    assert!(matches!(err, PoolError::Spawn { .. }));
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_subprocess_timeout_covers_request_write() {
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("idle-worker.sh");
    std::fs::write(&script, "#!/bin/sh\nexec sleep 15\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    // Far larger than a pipe buffer, so the write blocks while the worker ignores stdin.
    let description = "Python and SQL reporting. ".repeat(8_000);
    let jobs = (0..2)
        .map(|i| job(&format!("j{i}")).with_description(description.clone()))
        .collect();

    let launcher = SubprocessLauncher::new(&script).with_timeout(Duration::from_secs(1));
    let started = Instant::now();
    let err = launcher
        .launch(request(jobs, EngineSpec::RuleBased))
        .await
        .unwrap_err();

    assert!(matches!(err, PoolError::Timeout { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
}
