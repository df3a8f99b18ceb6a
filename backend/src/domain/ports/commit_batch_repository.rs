//! Port for stored auto-commit batches and their rollback artifacts.
//!
//! Batches are written by the commit process; this port only reads them and
//! attaches rollback results.

use async_trait::async_trait;

use crate::domain::rollback::RollbackResult;
use crate::domain::{CommitBatch, CommitBatchKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by commit batch repository adapters.
    pub enum CommitBatchRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "commit batch repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "commit batch repository query failed: {message}",
    }
}

/// Port for commit batch lookup and rollback bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitBatchRepository: Send + Sync {
    /// Find one batch within its church and job.
    async fn find_batch(
        &self,
        key: &CommitBatchKey,
    ) -> Result<Option<CommitBatch>, CommitBatchRepositoryError>;

    /// List the batches of one job, newest first.
    async fn list_batches(
        &self,
        church_id: i64,
        job_id: i64,
    ) -> Result<Vec<CommitBatch>, CommitBatchRepositoryError>;

    /// Store `result` as the batch's rollback artifact, replacing any
    /// earlier one.
    ///
    /// Returns `false` when the batch no longer exists.
    async fn record_rollback(
        &self,
        key: &CommitBatchKey,
        result: &RollbackResult,
    ) -> Result<bool, CommitBatchRepositoryError>;
}

/// Fixture implementation for tests that do not exercise batch storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommitBatchRepository;

#[async_trait]
impl CommitBatchRepository for FixtureCommitBatchRepository {
    async fn find_batch(
        &self,
        _key: &CommitBatchKey,
    ) -> Result<Option<CommitBatch>, CommitBatchRepositoryError> {
        Ok(None)
    }

    async fn list_batches(
        &self,
        _church_id: i64,
        _job_id: i64,
    ) -> Result<Vec<CommitBatch>, CommitBatchRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_rollback(
        &self,
        _key: &CommitBatchKey,
        _result: &RollbackResult,
    ) -> Result<bool, CommitBatchRepositoryError> {
        Ok(false)
    }
}
