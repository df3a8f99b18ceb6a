//! Stored auto-commit batches and their rollback state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rollback::{BatchId, RollbackResult};

/// Tenant-scoped address of one commit batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitBatchKey {
    /// Church (tenant) owning the batch.
    pub church_id: i64,
    /// OCR job the batch was committed from.
    pub job_id: i64,
    /// Batch identifier.
    pub batch_id: BatchId,
}

impl CommitBatchKey {
    /// Create a new key.
    pub fn new(church_id: i64, job_id: i64, batch_id: BatchId) -> Self {
        Self {
            church_id,
            job_id,
            batch_id,
        }
    }
}

/// One auto-commit batch as persisted by the commit process.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitBatch {
    /// Batch address.
    pub key: CommitBatchKey,
    /// When the batch was committed.
    pub created_at: DateTime<Utc>,
    /// Raw `autocommit_plan` artifact written before the commit ran.
    pub plan: Option<Value>,
    /// Raw `autocommit_results` artifact, if the commit got that far.
    pub results: Option<Value>,
    /// Most recent rollback artifact, if the batch was rolled back.
    pub rollback: Option<RollbackResult>,
}

impl CommitBatch {
    /// Whether a rollback has been recorded for this batch.
    pub fn is_rolled_back(&self) -> bool {
        self.rollback.is_some()
    }
}
