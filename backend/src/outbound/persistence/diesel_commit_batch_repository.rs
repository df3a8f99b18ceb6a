//! PostgreSQL-backed `CommitBatchRepository` implementation using Diesel ORM.
//!
//! Batches are always addressed by church, job, and batch ID together so a
//! batch ID guessed from another tenant never resolves.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommitBatchRepository, CommitBatchRepositoryError};
use crate::domain::rollback::{BatchId, RollbackResult};
use crate::domain::{CommitBatch, CommitBatchKey};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommitBatchRow, RollbackUpdate};
use super::pool::DbPool;
use super::schema::ocr_commit_batches;

/// Diesel-backed implementation of the commit batch repository port.
#[derive(Clone)]
pub struct DieselCommitBatchRepository {
    pool: DbPool,
}

impl DieselCommitBatchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_commit_batch(row: CommitBatchRow) -> Result<CommitBatch, CommitBatchRepositoryError> {
    let CommitBatchRow {
        batch_id,
        church_id,
        job_id,
        plan,
        results,
        rollback,
        created_at,
        ..
    } = row;

    let batch_id =
        BatchId::new(batch_id).map_err(|err| CommitBatchRepositoryError::query(err.to_string()))?;
    let rollback = rollback
        .map(serde_json::from_value::<RollbackResult>)
        .transpose()
        .map_err(|err| {
            CommitBatchRepositoryError::query(format!(
                "stored rollback for batch {batch_id} is malformed: {err}"
            ))
        })?;

    Ok(CommitBatch {
        key: CommitBatchKey::new(church_id, job_id, batch_id),
        created_at,
        plan,
        results,
        rollback,
    })
}

#[async_trait]
impl CommitBatchRepository for DieselCommitBatchRepository {
    async fn find_batch(
        &self,
        key: &CommitBatchKey,
    ) -> Result<Option<CommitBatch>, CommitBatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = ocr_commit_batches::table
            .filter(ocr_commit_batches::batch_id.eq(key.batch_id.as_str()))
            .filter(ocr_commit_batches::church_id.eq(key.church_id))
            .filter(ocr_commit_batches::job_id.eq(key.job_id))
            .select(CommitBatchRow::as_select())
            .first::<CommitBatchRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find commit batch"))?;

        row.map(row_to_commit_batch).transpose()
    }

    async fn list_batches(
        &self,
        church_id: i64,
        job_id: i64,
    ) -> Result<Vec<CommitBatch>, CommitBatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommitBatchRow> = ocr_commit_batches::table
            .filter(ocr_commit_batches::church_id.eq(church_id))
            .filter(ocr_commit_batches::job_id.eq(job_id))
            .order((
                ocr_commit_batches::created_at.desc(),
                ocr_commit_batches::batch_id.desc(),
            ))
            .select(CommitBatchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list commit batches"))?;

        rows.into_iter().map(row_to_commit_batch).collect()
    }

    async fn record_rollback(
        &self,
        key: &CommitBatchKey,
        result: &RollbackResult,
    ) -> Result<bool, CommitBatchRepositoryError> {
        let rollback = serde_json::to_value(result).map_err(|err| {
            CommitBatchRepositoryError::query(format!("failed to serialise rollback: {err}"))
        })?;
        let update = RollbackUpdate {
            rollback: Some(rollback),
            rolled_back_at: Some(result.rolled_back_at()),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            ocr_commit_batches::table
                .filter(ocr_commit_batches::batch_id.eq(key.batch_id.as_str()))
                .filter(ocr_commit_batches::church_id.eq(key.church_id))
                .filter(ocr_commit_batches::job_id.eq(key.job_id)),
        )
        .set(&update)
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "record rollback"))?;

        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion edge cases.

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    #[fixture]
    fn valid_row() -> CommitBatchRow {
        CommitBatchRow {
            batch_id: "batch-2026-02-27".to_owned(),
            church_id: 46,
            job_id: 42,
            plan: Some(json!({ "rows": [] })),
            results: Some(json!({ "rows": [] })),
            rollback: None,
            created_at: Utc
                .with_ymd_and_hms(2026, 2, 27, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            rolled_back_at: None,
        }
    }

    #[rstest]
    fn row_converts_to_batch(valid_row: CommitBatchRow) {
        let batch = row_to_commit_batch(valid_row).expect("valid row converts");

        assert_eq!(batch.key.batch_id.as_str(), "batch-2026-02-27");
        assert_eq!(batch.key.church_id, 46);
        assert_eq!(batch.plan, Some(json!({ "rows": [] })));
        assert_eq!(batch.key.job_id, 42);
        assert!(!batch.is_rolled_back());
    }

    #[rstest]
    fn blank_batch_id_is_rejected(mut valid_row: CommitBatchRow) {
        valid_row.batch_id = "  ".to_owned();

        let error = row_to_commit_batch(valid_row).expect_err("blank id fails");
        assert!(matches!(error, CommitBatchRepositoryError::Query { .. }));
    }

    #[rstest]
    fn malformed_rollback_is_rejected(mut valid_row: CommitBatchRow) {
        valid_row.rollback = Some(json!({ "method": "autocommit_rollback_v1" }));

        let error = row_to_commit_batch(valid_row).expect_err("malformed rollback fails");
        assert!(error.to_string().contains("stored rollback for batch batch-2026-02-27"));
    }

    #[rstest]
    fn stored_rollback_is_parsed(mut valid_row: CommitBatchRow) {
        valid_row.rollback = Some(json!({
            "method": "autocommit_rollback_v1",
            "batch_id": "batch-2026-02-27",
            "job_id": 42,
            "church_id": 46,
            "deleted": { "baptism_records": 1 },
            "missing": { "baptism_records": 0 },
            "deleted_ids": { "baptism_records": [100] },
            "missing_ids": { "baptism_records": [] },
            "total_deleted": 1,
            "total_missing": 0,
            "rolled_back_by": "admin@test.com",
            "rolled_back_at": "2026-02-27T12:30:00.000Z",
            "force": false
        }));

        let batch = row_to_commit_batch(valid_row).expect("stored rollback parses");
        let rollback = batch.rollback.expect("rollback present");
        assert_eq!(rollback.total_deleted(), 1);
        assert_eq!(rollback.rolled_back_by(), "admin@test.com");
    }
}
