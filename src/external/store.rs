use async_trait::async_trait;

use super::error::StoreError;
use crate::model::ProcessedJobRecord;

/// Persistent job store (write side used by the process-pool variant).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Applies all records in one bulk operation; returns how many rows were written.
    async fn apply_bulk(&self, records: &[ProcessedJobRecord]) -> Result<usize, StoreError>;
}
