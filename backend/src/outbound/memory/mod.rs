//! In-process adapters for tests and database-less local runs.
//!
//! State lives behind `RwLock`s; a poisoned lock is recovered rather than
//! propagated since every mutation leaves the maps consistent.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{
    CommitBatchRepository, CommitBatchRepositoryError, RecordStore, RecordStoreError,
};
use crate::domain::rollback::{RecordId, RollbackResult, TableName};
use crate::domain::{CommitBatch, CommitBatchKey};

/// Commit batches held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCommitBatchRepository {
    batches: RwLock<HashMap<CommitBatchKey, CommitBatch>>,
}

impl InMemoryCommitBatchRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `batch`, replacing any batch with the same key.
    pub fn insert(&self, batch: CommitBatch) {
        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(batch.key.clone(), batch);
    }
}

#[async_trait]
impl CommitBatchRepository for InMemoryCommitBatchRepository {
    async fn find_batch(
        &self,
        key: &CommitBatchKey,
    ) -> Result<Option<CommitBatch>, CommitBatchRepositoryError> {
        let batches = self.batches.read().unwrap_or_else(PoisonError::into_inner);
        Ok(batches.get(key).cloned())
    }

    async fn list_batches(
        &self,
        church_id: i64,
        job_id: i64,
    ) -> Result<Vec<CommitBatch>, CommitBatchRepositoryError> {
        let batches = self.batches.read().unwrap_or_else(PoisonError::into_inner);
        let mut listed: Vec<CommitBatch> = batches
            .values()
            .filter(|batch| batch.key.church_id == church_id && batch.key.job_id == job_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.key.batch_id.cmp(&a.key.batch_id))
        });
        Ok(listed)
    }

    async fn record_rollback(
        &self,
        key: &CommitBatchKey,
        result: &RollbackResult,
    ) -> Result<bool, CommitBatchRepositoryError> {
        let mut batches = self.batches.write().unwrap_or_else(PoisonError::into_inner);
        Ok(batches.get_mut(key).map_or(false, |batch| {
            batch.rollback = Some(result.clone());
            true
        }))
    }
}

/// Record tables held in memory as ID sets.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<HashMap<TableName, BTreeSet<RecordId>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `ids` to `table`.
    pub fn insert(&self, table: impl Into<TableName>, ids: impl IntoIterator<Item = RecordId>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.into())
            .or_default()
            .extend(ids);
    }

    /// IDs currently in `table`, ascending.
    pub fn ids(&self, table: &str) -> Vec<RecordId> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TableName::new(table))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn existing_ids(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<Vec<RecordId>, RecordStoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().copied().filter(|id| stored.contains(id)).collect())
    }

    async fn delete_records(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<u64, RecordStoreError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = tables.get_mut(table) else {
            return Ok(0);
        };
        let removed = ids.iter().filter(|id| stored.remove(*id)).count();
        u64::try_from(removed)
            .map_err(|_| RecordStoreError::query("deleted row count exceeds supported range"))
    }
}
