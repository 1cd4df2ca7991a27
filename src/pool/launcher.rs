use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use super::error::PoolError;
use super::types::{WorkerRequest, WorkerResponse};
use super::worker::analyze_group;
use crate::constants::{DEFAULT_WORKER_TIMEOUT_SECS, WORKER_BINARY};

/// Runs one group somewhere isolated from the driver.
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    fn name(&self) -> &str;

    async fn launch(&self, request: WorkerRequest) -> Result<WorkerResponse, PoolError>;
}

/// Runs each group in a fresh `jobsift-worker` process (JSON over stdin/stdout).
#[derive(Debug, Clone)]
pub struct SubprocessLauncher {
    program: PathBuf,
    timeout: Duration,
}

impl SubprocessLauncher {
    pub const ENV_WORKER_PATH: &'static str = "JOBSIFT_WORKER_PATH";

    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(DEFAULT_WORKER_TIMEOUT_SECS),
        }
    }

    /// `JOBSIFT_WORKER_PATH`, else `jobsift-worker` next to the current executable.
    pub fn locate() -> Result<Self, PoolError> {
        if let Some(path) = std::env::var(Self::ENV_WORKER_PATH)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            return Ok(Self::new(path));
        }

        let exe = std::env::current_exe().map_err(|e| PoolError::InvalidConfig {
            reason: format!("cannot resolve current executable: {e}"),
        })?;
        let dir = exe.parent().ok_or_else(|| PoolError::InvalidConfig {
            reason: format!("{} has no parent directory", exe.display()),
        })?;
        Ok(Self::new(dir.join(WORKER_BINARY)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl WorkerLauncher for SubprocessLauncher {
    fn name(&self) -> &str {
        "subprocess"
    }

    async fn launch(&self, request: WorkerRequest) -> Result<WorkerResponse, PoolError> {
        let worker_id = request.worker_id.clone();
        let payload = serde_json::to_vec(&request).map_err(|e| PoolError::Io {
            worker_id: worker_id.clone(),
            reason: format!("failed to serialize request: {e}"),
        })?;

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PoolError::Spawn {
                worker_id: worker_id.clone(),
                reason: format!("{}: {e}", self.program.display()),
            })?;

        debug!(worker_id = %worker_id, pid = child.id(), "Worker process spawned");

        // The timeout covers the request write as well as the wait.
        let exchange = {
            let worker_id = worker_id.clone();
            async move {
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(&payload).await.map_err(|e| PoolError::Io {
                        worker_id: worker_id.clone(),
                        reason: format!("failed to write request: {e}"),
                    })?;
                    stdin.shutdown().await.map_err(|e| PoolError::Io {
                        worker_id: worker_id.clone(),
                        reason: format!("failed to close stdin: {e}"),
                    })?;
                }
                child.wait_with_output().await.map_err(|e| PoolError::Io {
                    worker_id,
                    reason: e.to_string(),
                })
            }
        };

        // Expiry drops the child; kill_on_drop reaps it.
        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| PoolError::Timeout {
                worker_id: worker_id.clone(),
                timeout: self.timeout,
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(worker_id = %worker_id, status = %output.status, "Worker process failed");
            return Err(PoolError::Crashed {
                worker_id,
                reason: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| PoolError::InvalidResponse {
            worker_id,
            reason: e.to_string(),
        })
    }
}

/// Runs each group as its own tokio task; a panic inside the group is reported as a crash.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessLauncher;

impl InProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkerLauncher for InProcessLauncher {
    fn name(&self) -> &str {
        "in-process"
    }

    async fn launch(&self, request: WorkerRequest) -> Result<WorkerResponse, PoolError> {
        let worker_id = request.worker_id.clone();
        tokio::spawn(analyze_group(request))
            .await
            .map_err(|e| PoolError::Crashed {
                worker_id,
                reason: e.to_string(),
            })
    }
}
