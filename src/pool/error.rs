use std::time::Duration;

use thiserror::Error;

use crate::external::StoreError;

/// Process-pool failures.
///
/// Only [`PoolError::Store`] and [`PoolError::InvalidConfig`] escape
/// [`ProcessPool::run`](super::ProcessPool::run); worker failures are counted per group.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn worker {worker_id}: {reason}")]
    Spawn { worker_id: String, reason: String },

    #[error("worker {worker_id} I/O failed: {reason}")]
    Io { worker_id: String, reason: String },

    #[error("worker {worker_id} timed out after {timeout:?}")]
    Timeout { worker_id: String, timeout: Duration },

    #[error("worker {worker_id} crashed: {reason}")]
    Crashed { worker_id: String, reason: String },

    #[error("worker {worker_id} returned an invalid response: {reason}")]
    InvalidResponse { worker_id: String, reason: String },

    #[error("invalid pool configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
