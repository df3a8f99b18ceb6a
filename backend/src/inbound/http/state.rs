//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BatchRollbackCommand, CommitBatchQuery, FixtureBatchRollbackCommand, FixtureCommitBatchQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Rollback use-case.
    pub rollback: Arc<dyn BatchRollbackCommand>,
    /// Batch history use-case.
    pub batches: Arc<dyn CommitBatchQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use records_backend::domain::ports::{FixtureBatchRollbackCommand, FixtureCommitBatchQuery};
    /// use records_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureBatchRollbackCommand),
    ///     Arc::new(FixtureCommitBatchQuery),
    /// );
    /// let _rollback = state.rollback.clone();
    /// ```
    pub fn new(rollback: Arc<dyn BatchRollbackCommand>, batches: Arc<dyn CommitBatchQuery>) -> Self {
        Self { rollback, batches }
    }

    /// Build state from one service implementing both ports.
    pub fn from_service<T>(service: Arc<T>) -> Self
    where
        T: BatchRollbackCommand + CommitBatchQuery + 'static,
    {
        Self {
            rollback: service.clone(),
            batches: service,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureBatchRollbackCommand),
            Arc::new(FixtureCommitBatchQuery),
        )
    }
}
