//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`; the
//! wrappers here mirror their serialised shape for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No authenticated operator.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The batch does not exist for this church and job.
    #[schema(rename = "not_found")]
    NotFound,
    /// The batch is busy, already rolled back, or has missing records.
    #[schema(rename = "conflict")]
    Conflict,
    /// Storage is unreachable or a deletion failed.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "batch batch-2026-02-27 already rolled back")]
    message: String,
    /// Supplementary error details, such as per-table missing counts.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::rollback::RollbackResult`].
///
/// Per-table maps are keyed by table name in first-seen order.
#[derive(ToSchema)]
#[schema(as = crate::domain::rollback::RollbackResult)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RollbackResultSchema {
    /// Always `autocommit_rollback_v1`.
    #[schema(example = "autocommit_rollback_v1")]
    method: String,
    batch_id: String,
    job_id: i64,
    church_id: i64,
    /// Deleted record count per table.
    #[schema(value_type = Object)]
    deleted: serde_json::Value,
    /// Already-gone record count per table.
    #[schema(value_type = Object)]
    missing: serde_json::Value,
    /// Deleted record IDs per table.
    #[schema(value_type = Object)]
    deleted_ids: serde_json::Value,
    /// Already-gone record IDs per table.
    #[schema(value_type = Object)]
    missing_ids: serde_json::Value,
    total_deleted: usize,
    total_missing: usize,
    rolled_back_by: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    #[schema(example = "2026-02-27T12:30:00.000Z")]
    rolled_back_at: String,
    force: bool,
}
