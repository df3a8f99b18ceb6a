//! Driving port for rolling back one auto-commit batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::rollback::{BatchId, RollbackResult, RollbackVerification, TableMap};
use crate::domain::{CommitBatchKey, Error};

/// Command request for one rollback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRollbackRequest {
    /// Batch to roll back.
    pub key: CommitBatchKey,
    /// Authenticated operator requesting the rollback.
    pub actor: String,
    /// Report what would happen without deleting anything.
    pub dry_run: bool,
    /// Proceed even though some records are already gone.
    pub force: bool,
}

/// What a rollback would delete, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackPreview {
    /// Batch that was previewed.
    pub batch_id: BatchId,
    /// Per-table count of records that would be deleted.
    pub deleted: TableMap<usize>,
    /// Per-table count of records that are already gone.
    pub missing: TableMap<usize>,
    /// Total records that would be deleted.
    pub total_would_delete: usize,
    /// Total records that are already gone.
    pub total_missing: usize,
}

impl From<&RollbackVerification> for RollbackPreview {
    fn from(verification: &RollbackVerification) -> Self {
        Self {
            batch_id: verification.batch_id().clone(),
            deleted: verification.deleted_counts().clone(),
            missing: verification.missing_counts().clone(),
            total_would_delete: verification.total_existing(),
            total_missing: verification.total_missing(),
        }
    }
}

/// Outcome of a rollback command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRollbackOutcome {
    /// Dry run: nothing was deleted or recorded.
    DryRun(RollbackPreview),
    /// Records were deleted and the result was stored on the batch.
    Executed(RollbackResult),
}

/// Driving port for batch rollback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchRollbackCommand: Send + Sync {
    /// Preview or execute the rollback described by `request`.
    async fn rollback_batch(
        &self,
        request: BatchRollbackRequest,
    ) -> Result<BatchRollbackOutcome, Error>;
}

/// Fixture command that previews an empty rollback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureBatchRollbackCommand;

#[async_trait]
impl BatchRollbackCommand for FixtureBatchRollbackCommand {
    async fn rollback_batch(
        &self,
        request: BatchRollbackRequest,
    ) -> Result<BatchRollbackOutcome, Error> {
        Ok(BatchRollbackOutcome::DryRun(RollbackPreview {
            batch_id: request.key.batch_id,
            deleted: TableMap::new(),
            missing: TableMap::new(),
            total_would_delete: 0,
            total_missing: 0,
        }))
    }
}
