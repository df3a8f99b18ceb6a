//! Driving port for listing a job's commit batches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Error;
use crate::domain::rollback::{BatchId, RollbackResult};

/// One batch as shown in the review screen's batch history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitBatchSummary {
    /// Batch identifier.
    pub batch_id: BatchId,
    /// When the batch was committed.
    pub created_at: DateTime<Utc>,
    /// Number of rows the batch committed with a record to roll back.
    pub committed_count: usize,
    /// Raw `autocommit_plan` artifact.
    pub plan: Option<Value>,
    /// Raw `autocommit_results` artifact.
    pub results: Option<Value>,
    /// Stored rollback artifact, if any.
    pub rollback: Option<RollbackResult>,
    /// Whether the batch has been rolled back.
    pub rolled_back: bool,
}

/// Driving port for batch history reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitBatchQuery: Send + Sync {
    /// List the batches of one job, newest first.
    async fn list_batches(
        &self,
        church_id: i64,
        job_id: i64,
    ) -> Result<Vec<CommitBatchSummary>, Error>;
}

/// Fixture query returning no batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCommitBatchQuery;

#[async_trait]
impl CommitBatchQuery for FixtureCommitBatchQuery {
    async fn list_batches(
        &self,
        _church_id: i64,
        _job_id: i64,
    ) -> Result<Vec<CommitBatchSummary>, Error> {
        Ok(Vec::new())
    }
}
