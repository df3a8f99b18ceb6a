//! Shared Diesel and pool error mapping for the persistence adapters.

use tracing::debug;

use crate::domain::ports::{CommitBatchRepositoryError, RecordStoreError};

use super::pool::PoolError;

/// Port errors that distinguish connection failures from query failures.
pub(crate) trait PersistenceError {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

impl PersistenceError for CommitBatchRepositoryError {
    fn connection(message: String) -> Self {
        Self::Connection { message }
    }

    fn query(message: String) -> Self {
        Self::Query { message }
    }
}

impl PersistenceError for RecordStoreError {
    fn connection(message: String) -> Self {
        Self::Connection { message }
    }

    fn query(message: String) -> Self {
        Self::Query { message }
    }
}

/// Pool failures always surface as connection errors.
pub(crate) fn map_pool_error<E: PersistenceError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => E::connection(message),
    }
}

/// Map a Diesel error, logging the detail that is not passed upward.
pub(crate) fn map_diesel_error<E: PersistenceError>(
    error: diesel::result::Error,
    operation: &'static str,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        other => debug!(error = %other, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection(format!("{operation}: database connection closed"))
        }
        DieselError::NotFound => E::query(format!("{operation}: record not found")),
        DieselError::DeserializationError(_) => {
            E::query(format!("{operation}: unexpected row shape"))
        }
        _ => E::query(format!("{operation}: database error")),
    }
}
