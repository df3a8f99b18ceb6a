//! Auto-commit batch review HTTP handlers.
//!
//! ```text
//! GET  /api/church/{church_id}/ocr/jobs/{job_id}/review/commit-batches
//! POST /api/church/{church_id}/ocr/jobs/{job_id}/review/rollback-batch
//! ```

use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::ports::{
    BatchRollbackOutcome, BatchRollbackRequest, CommitBatchSummary, RollbackPreview,
};
use crate::domain::rollback::{BatchId, RollbackResult, TableMap};
use crate::domain::{CommitBatchKey, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RollbackResultSchema};
use crate::inbound::http::state::HttpState;

/// Header carrying the operator authenticated by the fronting proxy.
pub const AUTHENTICATED_USER_HEADER: &str = "X-Authenticated-User";

/// Request payload for rolling back a batch.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RollbackBatchRequestBody {
    /// Batch to roll back.
    pub batch_id: String,
    /// Preview only; nothing is deleted.
    #[serde(default)]
    pub dry_run: bool,
    /// Roll back the remaining records even if some are already gone.
    #[serde(default)]
    pub force: bool,
}

/// Response payload for a dry run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DryRunResponseBody {
    pub ok: bool,
    pub dry_run: bool,
    pub batch_id: String,
    /// Records that would be deleted, per table.
    #[schema(value_type = Object)]
    pub deleted: TableMap<usize>,
    /// Records already gone, per table.
    #[schema(value_type = Object)]
    pub missing: TableMap<usize>,
    pub total_would_delete: usize,
    pub total_missing: usize,
}

/// Response payload for an executed rollback.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExecutedResponseBody {
    pub ok: bool,
    pub dry_run: bool,
    pub batch_id: String,
    /// Records deleted, per table.
    #[schema(value_type = Object)]
    pub deleted: TableMap<usize>,
    /// Records already gone, per table.
    #[schema(value_type = Object)]
    pub missing: TableMap<usize>,
    pub total_deleted: usize,
    pub total_missing: usize,
    /// Audit artifact stored on the batch.
    #[schema(value_type = RollbackResultSchema)]
    pub rollback: RollbackResult,
}

/// Response payload for a rollback request.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RollbackBatchResponseBody {
    DryRun(DryRunResponseBody),
    Executed(ExecutedResponseBody),
}

impl From<RollbackPreview> for DryRunResponseBody {
    fn from(preview: RollbackPreview) -> Self {
        Self {
            ok: true,
            dry_run: true,
            batch_id: preview.batch_id.into(),
            deleted: preview.deleted,
            missing: preview.missing,
            total_would_delete: preview.total_would_delete,
            total_missing: preview.total_missing,
        }
    }
}

impl From<RollbackResult> for ExecutedResponseBody {
    fn from(result: RollbackResult) -> Self {
        Self {
            ok: true,
            dry_run: false,
            batch_id: result.batch_id().to_string(),
            deleted: result.deleted().clone(),
            missing: result.missing().clone(),
            total_deleted: result.total_deleted(),
            total_missing: result.total_missing(),
            rollback: result,
        }
    }
}

impl From<BatchRollbackOutcome> for RollbackBatchResponseBody {
    fn from(outcome: BatchRollbackOutcome) -> Self {
        match outcome {
            BatchRollbackOutcome::DryRun(preview) => Self::DryRun(preview.into()),
            BatchRollbackOutcome::Executed(result) => Self::Executed(result.into()),
        }
    }
}

/// One batch in the review history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommitBatchSummaryBody {
    pub batch_id: String,
    /// RFC 3339 commit timestamp.
    pub created_at: String,
    /// Rows the batch committed with a record to roll back.
    pub committed_count: usize,
    /// Raw `autocommit_plan` artifact.
    #[schema(value_type = Option<Object>)]
    pub plan: Option<Value>,
    /// Raw `autocommit_results` artifact.
    #[schema(value_type = Option<Object>)]
    pub results: Option<Value>,
    /// Stored rollback artifact.
    #[schema(value_type = Option<RollbackResultSchema>)]
    pub rollback: Option<RollbackResult>,
    pub rolled_back: bool,
}

impl From<CommitBatchSummary> for CommitBatchSummaryBody {
    fn from(summary: CommitBatchSummary) -> Self {
        Self {
            batch_id: summary.batch_id.into(),
            created_at: summary.created_at.to_rfc3339(),
            committed_count: summary.committed_count,
            plan: summary.plan,
            results: summary.results,
            rollback: summary.rollback,
            rolled_back: summary.rolled_back,
        }
    }
}

/// Response payload for listing batches.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListBatchesResponseBody {
    pub batches: Vec<CommitBatchSummaryBody>,
}

#[derive(Debug, Deserialize)]
struct JobPath {
    church_id: i64,
    job_id: i64,
}

fn authenticated_actor(request: &HttpRequest) -> Result<String, Error> {
    request
        .headers()
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|actor| !actor.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("authentication required"))
}

fn parse_batch_id(raw: String) -> Result<BatchId, Error> {
    BatchId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "batch_id",
            "code": "invalid_batch_id",
        }))
    })
}

/// List a job's auto-commit batches, newest first.
#[utoipa::path(
    get,
    path = "/api/church/{church_id}/ocr/jobs/{job_id}/review/commit-batches",
    params(
        ("church_id" = i64, Path, description = "Church identifier"),
        ("job_id" = i64, Path, description = "OCR job identifier")
    ),
    responses(
        (status = 200, description = "Commit batches", body = ListBatchesResponseBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["review"],
    operation_id = "listCommitBatches",
    security(("AuthenticatedUser" = []))
)]
#[get("/church/{church_id}/ocr/jobs/{job_id}/review/commit-batches")]
pub async fn list_commit_batches(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<JobPath>,
) -> ApiResult<web::Json<ListBatchesResponseBody>> {
    authenticated_actor(&request)?;
    let JobPath { church_id, job_id } = path.into_inner();

    let batches = state.batches.list_batches(church_id, job_id).await?;

    Ok(web::Json(ListBatchesResponseBody {
        batches: batches.into_iter().map(CommitBatchSummaryBody::from).collect(),
    }))
}

/// Preview or execute the rollback of one auto-commit batch.
#[utoipa::path(
    post,
    path = "/api/church/{church_id}/ocr/jobs/{job_id}/review/rollback-batch",
    request_body = RollbackBatchRequestBody,
    params(
        ("church_id" = i64, Path, description = "Church identifier"),
        ("job_id" = i64, Path, description = "OCR job identifier")
    ),
    responses(
        (status = 200, description = "Rollback previewed or executed", body = RollbackBatchResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Batch not found", body = ErrorSchema),
        (status = 409, description = "Conflict", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["review"],
    operation_id = "rollbackCommitBatch",
    security(("AuthenticatedUser" = []))
)]
#[post("/church/{church_id}/ocr/jobs/{job_id}/review/rollback-batch")]
pub async fn rollback_commit_batch(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<JobPath>,
    payload: web::Json<RollbackBatchRequestBody>,
) -> ApiResult<web::Json<RollbackBatchResponseBody>> {
    let actor = authenticated_actor(&request)?;
    let JobPath { church_id, job_id } = path.into_inner();
    let RollbackBatchRequestBody {
        batch_id,
        dry_run,
        force,
    } = payload.into_inner();
    let batch_id = parse_batch_id(batch_id)?;

    let outcome = state
        .rollback
        .rollback_batch(BatchRollbackRequest {
            key: CommitBatchKey::new(church_id, job_id, batch_id),
            actor,
            dry_run,
            force,
        })
        .await?;

    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
#[path = "commit_batches_tests.rs"]
mod tests;
