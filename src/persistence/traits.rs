//! Storage interface for divergence artifacts.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistenceError;
use crate::models::BlockRecord;

/// Writes the original records of a divergent sequence somewhere a human
/// can inspect them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persists `record` as served by the source named `label` and returns
    /// where it was written.
    ///
    /// Writing the same `(label, sequence)` twice replaces the earlier file.
    async fn write_record(
        &self,
        label: &str,
        sequence: u64,
        record: &BlockRecord,
    ) -> Result<PathBuf, PersistenceError>;
}
