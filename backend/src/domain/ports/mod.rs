//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod batch_rollback_command;
mod commit_batch_query;
mod commit_batch_repository;
mod record_store;

#[cfg(test)]
pub use batch_rollback_command::MockBatchRollbackCommand;
pub use batch_rollback_command::{
    BatchRollbackCommand, BatchRollbackOutcome, BatchRollbackRequest,
    FixtureBatchRollbackCommand, RollbackPreview,
};
#[cfg(test)]
pub use commit_batch_query::MockCommitBatchQuery;
pub use commit_batch_query::{CommitBatchQuery, CommitBatchSummary, FixtureCommitBatchQuery};
#[cfg(test)]
pub use commit_batch_repository::MockCommitBatchRepository;
pub use commit_batch_repository::{
    CommitBatchRepository, CommitBatchRepositoryError, FixtureCommitBatchRepository,
};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{FixtureRecordStore, RecordStore, RecordStoreError};
