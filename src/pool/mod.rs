//! Process-pool variant: fixed groups of jobs analysed end to end by isolated workers.
//!
//! The driver ([`ProcessPool`]) splits jobs into [`WorkerRequest`]s and hands them to a
//! [`WorkerLauncher`]. [`SubprocessLauncher`] runs the `jobsift-worker` binary per group;
//! [`InProcessLauncher`] runs groups as tasks. Either way the worker side is
//! [`analyze_group`].

mod driver;
mod error;
mod launcher;
mod types;
mod worker;

#[cfg(test)]
mod tests;

pub use driver::{PoolConfig, ProcessPool};
pub use error::PoolError;
pub use launcher::{InProcessLauncher, SubprocessLauncher, WorkerLauncher};
pub use types::{EngineSpec, PoolRunReport, WorkerRequest, WorkerResponse};
pub use worker::{analyze_group, build_enricher, validate_job};
