//! Batch rollback orchestration service.
//!
//! This service owns the rollback flow for one auto-commit batch:
//! - loading the batch and its `autocommit_results` artifact;
//! - checking the planned tables against the record-table allow-list;
//! - verifying which records still exist;
//! - previewing (dry run) or deleting and recording the audit artifact.
//!
//! Rollbacks of the same batch are serialised; different batches proceed
//! in parallel.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    BatchRollbackCommand, BatchRollbackOutcome, BatchRollbackRequest, CommitBatchQuery,
    CommitBatchRepository, CommitBatchSummary, RecordStore, RollbackPreview,
};
use crate::domain::rollback::{
    ExistenceSnapshot, RollbackContext, RollbackPlan, RollbackVerification,
    build_rollback_result, extract_rollback_targets, verify_targets,
};
use crate::domain::{CommitBatch, Error, RecordTables};

use super::batch_rollback_service_support::{
    BatchLocks, map_batch_repository_error, map_record_store_error,
};

/// Domain service implementing batch rollback and batch history.
#[derive(Clone)]
pub struct BatchRollbackService<B, S> {
    batches: Arc<B>,
    records: Arc<S>,
    record_tables: RecordTables,
    clock: Arc<dyn Clock>,
    locks: Arc<BatchLocks>,
}

impl<B, S> BatchRollbackService<B, S> {
    /// Create a new rollback service.
    pub fn new(
        batches: Arc<B>,
        records: Arc<S>,
        record_tables: RecordTables,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            batches,
            records,
            record_tables,
            clock,
            locks: Arc::new(BatchLocks::default()),
        }
    }
}

impl<B, S> BatchRollbackService<B, S>
where
    B: CommitBatchRepository,
    S: RecordStore,
{
    fn ensure_known_tables(&self, plan: &RollbackPlan) -> Result<(), Error> {
        let unknown = self.record_tables.unknown_in(plan);
        if unknown.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = unknown.iter().map(|table| table.as_str()).collect();
        Err(Error::invalid_request(format!(
            "batch references tables outside the record allow-list: {}",
            names.join(", ")
        ))
        .with_details(json!({ "unknown_tables": names })))
    }

    async fn snapshot(&self, plan: &RollbackPlan) -> Result<ExistenceSnapshot, Error> {
        let mut snapshot = ExistenceSnapshot::new();
        for (table, ids) in plan.by_table().iter() {
            let found = self
                .records
                .existing_ids(table, ids)
                .await
                .map_err(map_record_store_error)?;
            snapshot.insert(table.clone(), found);
        }
        Ok(snapshot)
    }

    async fn delete_existing(&self, verification: &RollbackVerification) -> Result<(), Error> {
        for (table, ids) in verification.existing().iter() {
            if ids.is_empty() {
                continue;
            }
            let deleted = self
                .records
                .delete_records(table, ids)
                .await
                .map_err(|error| {
                    warn!(
                        batch_id = %verification.batch_id(),
                        table = %table,
                        %error,
                        "rollback aborted part-way; earlier tables stay deleted"
                    );
                    map_record_store_error(error)
                })?;
            if usize::try_from(deleted).ok() != Some(ids.len()) {
                warn!(
                    batch_id = %verification.batch_id(),
                    table = %table,
                    verified = ids.len(),
                    deleted,
                    "deleted row count differs from verified count"
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B, S> BatchRollbackCommand for BatchRollbackService<B, S>
where
    B: CommitBatchRepository,
    S: RecordStore,
{
    async fn rollback_batch(
        &self,
        request: BatchRollbackRequest,
    ) -> Result<BatchRollbackOutcome, Error> {
        let BatchRollbackRequest {
            key,
            actor,
            dry_run,
            force,
        } = request;

        let _guard = self.locks.try_acquire(&key).ok_or_else(|| {
            Error::conflict(format!(
                "a rollback of batch {} is already in progress",
                key.batch_id
            ))
        })?;

        let batch = self
            .batches
            .find_batch(&key)
            .await
            .map_err(map_batch_repository_error)?
            .ok_or_else(|| Error::not_found(format!("commit batch {} not found", key.batch_id)))?;

        if batch.is_rolled_back() && !dry_run && !force {
            return Err(Error::conflict(format!(
                "batch {} already rolled back",
                key.batch_id
            )));
        }

        let plan = extract_rollback_targets(batch.results.as_ref(), &key.batch_id);
        self.ensure_known_tables(&plan)?;
        let snapshot = self.snapshot(&plan).await?;
        let verification = verify_targets(&plan, &snapshot);

        if dry_run {
            return Ok(BatchRollbackOutcome::DryRun(RollbackPreview::from(
                &verification,
            )));
        }

        if verification.total_missing() > 0 {
            if !force {
                return Err(Error::conflict(format!(
                    "{} record(s) from batch {} no longer exist; re-run with force to roll back the rest",
                    verification.total_missing(),
                    key.batch_id
                ))
                .with_details(json!({
                    "missing": verification.missing_counts(),
                    "total_missing": verification.total_missing(),
                })));
            }
            warn!(
                batch_id = %key.batch_id,
                total_missing = verification.total_missing(),
                actor = %actor,
                "forcing rollback past missing records"
            );
        }

        self.delete_existing(&verification).await?;

        let result = build_rollback_result(
            &verification,
            RollbackContext {
                batch_id: key.batch_id.clone(),
                job_id: key.job_id,
                church_id: key.church_id,
                rolled_back_by: actor,
                force,
            },
            self.clock.as_ref(),
        );

        let recorded = self
            .batches
            .record_rollback(&key, &result)
            .await
            .map_err(map_batch_repository_error)?;
        if !recorded {
            return Err(Error::not_found(format!(
                "commit batch {} disappeared before its rollback was recorded",
                key.batch_id
            )));
        }

        info!(
            batch_id = %key.batch_id,
            church_id = key.church_id,
            job_id = key.job_id,
            total_deleted = result.total_deleted(),
            total_missing = result.total_missing(),
            rolled_back_by = result.rolled_back_by(),
            "commit batch rolled back"
        );
        Ok(BatchRollbackOutcome::Executed(result))
    }
}

#[async_trait]
impl<B, S> CommitBatchQuery for BatchRollbackService<B, S>
where
    B: CommitBatchRepository,
    S: RecordStore,
{
    async fn list_batches(
        &self,
        church_id: i64,
        job_id: i64,
    ) -> Result<Vec<CommitBatchSummary>, Error> {
        let batches = self
            .batches
            .list_batches(church_id, job_id)
            .await
            .map_err(map_batch_repository_error)?;
        Ok(batches.into_iter().map(summarise).collect())
    }
}

fn summarise(batch: CommitBatch) -> CommitBatchSummary {
    let targets = extract_rollback_targets(batch.results.as_ref(), &batch.key.batch_id);
    let rolled_back = batch.is_rolled_back();
    CommitBatchSummary {
        batch_id: batch.key.batch_id,
        created_at: batch.created_at,
        committed_count: targets.total_targets(),
        plan: batch.plan,
        results: batch.results,
        rollback: batch.rollback,
        rolled_back,
    }
}

#[cfg(test)]
#[path = "batch_rollback_service_tests.rs"]
mod tests;
