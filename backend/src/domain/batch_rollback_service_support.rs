//! Internal helpers for the batch rollback service.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::domain::ports::{CommitBatchRepositoryError, RecordStoreError};
use crate::domain::{CommitBatchKey, Error};

pub(crate) fn map_batch_repository_error(error: CommitBatchRepositoryError) -> Error {
    match error {
        CommitBatchRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("commit batch repository unavailable: {message}"))
        }
        CommitBatchRepositoryError::Query { message } => {
            Error::internal(format!("commit batch repository error: {message}"))
        }
    }
}

pub(crate) fn map_record_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Connection { message } | RecordStoreError::Query { message } => {
            Error::service_unavailable(format!("record store unavailable: {message}"))
        }
        RecordStoreError::UnsupportedTable { table } => {
            Error::invalid_request(format!("table {table} cannot be rolled back"))
        }
    }
}

/// Batches with a rollback currently in flight.
#[derive(Debug, Default)]
pub(crate) struct BatchLocks {
    held: Mutex<HashSet<CommitBatchKey>>,
}

impl BatchLocks {
    /// Claim `key`, or return `None` when another rollback holds it.
    pub(crate) fn try_acquire(&self, key: &CommitBatchKey) -> Option<BatchLockGuard<'_>> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(key.clone()) {
            return None;
        }
        Some(BatchLockGuard {
            locks: self,
            key: key.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self, key: &CommitBatchKey) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its batch when dropped.
#[derive(Debug)]
pub(crate) struct BatchLockGuard<'a> {
    locks: &'a BatchLocks,
    key: CommitBatchKey,
}

impl Drop for BatchLockGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::rollback::BatchId;

    fn key(batch: &str) -> CommitBatchKey {
        CommitBatchKey::new(46, 42, BatchId::new(batch).expect("valid batch id"))
    }

    #[rstest]
    fn second_claim_on_same_batch_fails_until_release() {
        let locks = BatchLocks::default();
        let first = locks.try_acquire(&key("b-1")).expect("first claim succeeds");

        assert!(locks.try_acquire(&key("b-1")).is_none());
        drop(first);
        assert!(!locks.is_held(&key("b-1")));
        assert!(locks.try_acquire(&key("b-1")).is_some());
    }

    #[rstest]
    fn different_batches_do_not_contend() {
        let locks = BatchLocks::default();
        let _a = locks.try_acquire(&key("b-1")).expect("claim b-1");
        let _b = locks.try_acquire(&key("b-2")).expect("claim b-2");
        assert!(locks.is_held(&key("b-1")));
        assert!(locks.is_held(&key("b-2")));
    }

    #[rstest]
    fn same_batch_id_in_other_church_is_separate() {
        let locks = BatchLocks::default();
        let _ours = locks.try_acquire(&key("b-1")).expect("claim ours");
        let theirs = CommitBatchKey::new(7, 42, BatchId::new("b-1").expect("valid batch id"));
        assert!(locks.try_acquire(&theirs).is_some());
    }

    #[rstest]
    #[case(RecordStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RecordStoreError::query("deadlock detected"), ErrorCode::ServiceUnavailable)]
    #[case(RecordStoreError::unsupported_table("bad name"), ErrorCode::InvalidRequest)]
    fn record_store_errors_map_to_codes(#[case] error: RecordStoreError, #[case] code: ErrorCode) {
        assert_eq!(map_record_store_error(error).code(), code);
    }

    #[rstest]
    #[case(CommitBatchRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(CommitBatchRepositoryError::query("syntax error"), ErrorCode::InternalError)]
    fn batch_repository_errors_map_to_codes(
        #[case] error: CommitBatchRepositoryError,
        #[case] code: ErrorCode,
    ) {
        assert_eq!(map_batch_repository_error(error).code(), code);
    }
}
