//! Existence verification: reconcile a plan against what storage still holds.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{BatchId, RecordId, RollbackPlan, TableMap, TableName};

/// IDs the caller confirmed still exist, per table.
///
/// Tables that were never added behave as if no IDs exist in them.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::{ExistenceSnapshot, TableName};
///
/// let snapshot: ExistenceSnapshot = [("baptism_records", vec![100, 102])]
///     .into_iter()
///     .collect();
/// let table = TableName::new("baptism_records");
/// assert!(snapshot.contains(&table, 100));
/// assert!(!snapshot.contains(&table, 101));
/// assert!(!snapshot.contains(&TableName::new("marriage_records"), 100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ExistenceSnapshot {
    tables: HashMap<TableName, HashSet<RecordId>>,
}

impl ExistenceSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ids` as present in `table`, merging with earlier entries.
    pub fn insert(&mut self, table: TableName, ids: impl IntoIterator<Item = RecordId>) {
        self.tables.entry(table).or_default().extend(ids);
    }

    /// Whether `id` was confirmed to exist in `table`.
    pub fn contains(&self, table: &TableName, id: RecordId) -> bool {
        self.tables
            .get(table)
            .is_some_and(|ids| ids.contains(&id))
    }
}

impl<T, I> FromIterator<(T, I)> for ExistenceSnapshot
where
    T: Into<TableName>,
    I: IntoIterator<Item = RecordId>,
{
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        let mut snapshot = Self::new();
        for (table, ids) in iter {
            snapshot.insert(table.into(), ids);
        }
        snapshot
    }
}

/// Partition of a plan's targets into still-present and already-gone IDs.
///
/// ## Invariants
/// - Every table of the plan appears in `existing`, `missing`,
///   `deleted_counts`, and `missing_counts`, in plan order.
/// - Per table, `existing` and `missing` are disjoint and together hold
///   exactly the plan's IDs for that table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackVerification {
    batch_id: BatchId,
    existing: TableMap<Vec<RecordId>>,
    missing: TableMap<Vec<RecordId>>,
    deleted_counts: TableMap<usize>,
    missing_counts: TableMap<usize>,
    total_existing: usize,
    total_missing: usize,
}

impl RollbackVerification {
    /// Batch the verified plan belongs to.
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// IDs still present, to be deleted.
    pub fn existing(&self) -> &TableMap<Vec<RecordId>> {
        &self.existing
    }

    /// IDs no longer present, to be reported.
    pub fn missing(&self) -> &TableMap<Vec<RecordId>> {
        &self.missing
    }

    /// Per-table count of `existing`.
    pub fn deleted_counts(&self) -> &TableMap<usize> {
        &self.deleted_counts
    }

    /// Per-table count of `missing`.
    pub fn missing_counts(&self) -> &TableMap<usize> {
        &self.missing_counts
    }

    /// Total IDs still present across tables.
    pub fn total_existing(&self) -> usize {
        self.total_existing
    }

    /// Total IDs already gone across tables.
    pub fn total_missing(&self) -> usize {
        self.total_missing
    }
}

/// Split each table's targets by whether the snapshot still lists them.
///
/// Verification keeps no memory between calls: repeating it after some
/// records were deleted reports those as missing.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::{
///     BatchId, ExistenceSnapshot, extract_rollback_targets, verify_targets,
/// };
/// use serde_json::json;
///
/// let batch_id = BatchId::new("b-1").expect("valid batch id");
/// let results = json!({ "rows": [
///     { "outcome": "committed", "recordId": 100, "table": "baptism_records" },
///     { "outcome": "committed", "recordId": 101, "table": "baptism_records" },
/// ]});
/// let plan = extract_rollback_targets(Some(&results), &batch_id);
/// let snapshot: ExistenceSnapshot = [("baptism_records", vec![100])].into_iter().collect();
///
/// let verification = verify_targets(&plan, &snapshot);
/// assert_eq!(verification.total_existing(), 1);
/// assert_eq!(verification.missing().get("baptism_records"), Some(&vec![101]));
/// ```
pub fn verify_targets(plan: &RollbackPlan, snapshot: &ExistenceSnapshot) -> RollbackVerification {
    let mut existing = TableMap::new();
    let mut missing = TableMap::new();

    for (table, ids) in plan.by_table().iter() {
        let (found, gone): (Vec<RecordId>, Vec<RecordId>) = ids
            .iter()
            .copied()
            .partition(|id| snapshot.contains(table, *id));
        existing.insert(table.clone(), found);
        missing.insert(table.clone(), gone);
    }

    let deleted_counts = existing.map_values(Vec::len);
    let missing_counts = missing.map_values(Vec::len);
    let total_existing: usize = deleted_counts.iter().map(|(_, count)| count).sum();
    let total_missing: usize = missing_counts.iter().map(|(_, count)| count).sum();

    RollbackVerification {
        batch_id: plan.batch_id().clone(),
        existing,
        missing,
        deleted_counts,
        missing_counts,
        total_existing,
        total_missing,
    }
}
