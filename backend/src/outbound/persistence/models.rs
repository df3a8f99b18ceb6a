//! Internal Diesel row structs; never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde_json::Value;

use super::schema::ocr_commit_batches;

/// Row read from `ocr_commit_batches`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ocr_commit_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommitBatchRow {
    pub batch_id: String,
    pub church_id: i64,
    pub job_id: i64,
    pub plan: Option<Value>,
    pub results: Option<Value>,
    pub rollback: Option<Value>,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "denormalised copy of rollback.rolled_back_at for SQL filtering")]
    pub rolled_back_at: Option<DateTime<Utc>>,
}

/// Changeset attaching a rollback artifact to a batch.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = ocr_commit_batches)]
pub(crate) struct RollbackUpdate {
    pub rollback: Option<Value>,
    pub rolled_back_at: Option<DateTime<Utc>>,
}

/// Single `id` column returned by dynamic record-table queries.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RecordIdRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}
