//! Auto-commit batch rollback engine.
//!
//! Undoing an auto-commit batch is a three-step pipeline of pure functions:
//!
//! 1. [`extract_rollback_targets`] reads a batch's results artifact and keeps
//!    the committed rows that carry both a record ID and a table
//!    ([`RollbackPlan`]).
//! 2. [`verify_targets`] splits those targets, per table, into IDs that still
//!    exist and IDs that are already gone, against an [`ExistenceSnapshot`]
//!    the caller queried beforehand ([`RollbackVerification`]).
//! 3. [`build_rollback_result`] stamps actor, tenant, and time onto the
//!    verification to produce the stored audit artifact ([`RollbackResult`]).
//!
//! None of the steps perform I/O or keep state, so dry runs and real
//! rollbacks share the same code and repeated rollbacks of one batch report
//! already-deleted records as missing instead of failing.

mod artifact;
mod ids;
mod plan;
mod result;
mod table_map;
mod verification;

pub use artifact::{CommitBatchArtifact, CommitBatchRow, CommitOutcome};
pub use ids::{BatchId, BatchIdValidationError, RecordId, TableName};
pub use plan::{RollbackPlan, RollbackTarget, extract_rollback_targets};
pub use result::{RollbackContext, RollbackResult, build_rollback_result};
pub use table_map::TableMap;
pub use verification::{ExistenceSnapshot, RollbackVerification, verify_targets};

/// Method tag carried by rollback plans and results.
pub const ROLLBACK_METHOD: &str = "autocommit_rollback_v1";
