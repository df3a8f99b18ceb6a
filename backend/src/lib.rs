//! Church records backend.
//!
//! Reviews and rolls back auto-commit batches: each batch records which OCR
//! candidates were written to which record table, and a rollback deletes
//! exactly those rows after checking they still exist, leaving an audit
//! artifact on the batch.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
