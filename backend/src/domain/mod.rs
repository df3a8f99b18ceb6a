//! Domain primitives, rollback logic, and orchestration services.
//!
//! Purpose: Define the strongly typed rollback pipeline used by the HTTP and
//! persistence adapters. Pure functions live in [`rollback`]; the ports the
//! service depends on live in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - CommitBatch / CommitBatchKey: stored auto-commit batches.
//! - RecordTables: allow-list of record tables a rollback may touch.
//! - BatchRollbackService: implements the rollback and listing ports.

pub mod error;
pub mod ports;
pub mod rollback;

mod batch_rollback_service;
mod batch_rollback_service_support;
mod commit_batch;
mod record_tables;

pub use self::batch_rollback_service::BatchRollbackService;
pub use self::commit_batch::{CommitBatch, CommitBatchKey};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::record_tables::RecordTables;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use records_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::conflict("batch already rolled back"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
