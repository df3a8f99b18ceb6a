//! Target extraction: which committed records a rollback should remove.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    BatchId, CommitBatchArtifact, CommitBatchRow, CommitOutcome, ROLLBACK_METHOD, RecordId,
    TableMap, TableName,
};

/// One committed record eligible for rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackTarget {
    /// Identifier of the persisted record.
    pub record_id: RecordId,
    /// Table holding the record.
    pub table: TableName,
    /// Record type label carried over from the commit row.
    pub record_type: Option<String>,
}

impl RollbackTarget {
    fn from_row(row: &CommitBatchRow) -> Option<Self> {
        if row.outcome != Some(CommitOutcome::Committed) {
            return None;
        }
        let record_id = row.record_id?;
        let table = row.table.as_deref().filter(|table| !table.is_empty())?;
        Some(Self {
            record_id,
            table: TableName::new(table),
            record_type: row.record_type.clone(),
        })
    }
}

/// Records a rollback of one batch would remove, grouped per table.
///
/// ## Invariants
/// - `total_targets == targets.len()`.
/// - `total_targets` equals the sum of the ID list lengths in `by_table`.
/// - `by_table` lists tables in first-seen order and IDs in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackPlan {
    method: String,
    batch_id: BatchId,
    targets: Vec<RollbackTarget>,
    by_table: TableMap<Vec<RecordId>>,
    total_targets: usize,
}

impl RollbackPlan {
    /// Derive the plan for `batch_id` from a parsed artifact.
    ///
    /// A missing artifact yields an empty plan.
    pub fn extract(artifact: Option<&CommitBatchArtifact>, batch_id: &BatchId) -> Self {
        let targets: Vec<RollbackTarget> = artifact
            .map(|artifact| {
                artifact
                    .rows()
                    .iter()
                    .filter_map(RollbackTarget::from_row)
                    .collect()
            })
            .unwrap_or_default();

        let mut by_table: TableMap<Vec<RecordId>> = TableMap::new();
        for target in &targets {
            by_table.entry_or_default(&target.table).push(target.record_id);
        }

        Self {
            method: ROLLBACK_METHOD.to_owned(),
            batch_id: batch_id.clone(),
            total_targets: targets.len(),
            targets,
            by_table,
        }
    }

    /// Artifact method tag, always `autocommit_rollback_v1`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Batch the plan was derived from.
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// Targets in source row order.
    pub fn targets(&self) -> &[RollbackTarget] {
        &self.targets
    }

    /// Target IDs grouped by table.
    pub fn by_table(&self) -> &TableMap<Vec<RecordId>> {
        &self.by_table
    }

    /// Number of targets.
    pub fn total_targets(&self) -> usize {
        self.total_targets
    }

    /// Whether the plan targets nothing.
    pub fn is_empty(&self) -> bool {
        self.total_targets == 0
    }
}

/// Derive a rollback plan straight from a raw results artifact.
///
/// Absent or malformed input produces an empty plan; committed rows missing
/// a record ID or table are left out silently.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::{BatchId, extract_rollback_targets};
/// use serde_json::json;
///
/// let batch_id = BatchId::new("b-1").expect("valid batch id");
/// let results = json!({ "rows": [
///     { "outcome": "committed", "recordId": 100, "table": "baptism_records" },
///     { "outcome": "skipped", "recordId": null, "table": null },
/// ]});
///
/// let plan = extract_rollback_targets(Some(&results), &batch_id);
/// assert_eq!(plan.total_targets(), 1);
/// assert_eq!(plan.by_table().get("baptism_records"), Some(&vec![100]));
///
/// assert!(extract_rollback_targets(None, &batch_id).is_empty());
/// ```
pub fn extract_rollback_targets(artifact: Option<&Value>, batch_id: &BatchId) -> RollbackPlan {
    let artifact = artifact.map(CommitBatchArtifact::from);
    RollbackPlan::extract(artifact.as_ref(), batch_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn batch_id() -> BatchId {
        BatchId::new("test-batch-001").expect("valid batch id")
    }

    fn row(index: u64, outcome: &str, record_id: Option<i64>, table: Option<&str>) -> Value {
        json!({
            "candidateIndex": index,
            "sourceRowIndex": index,
            "outcome": outcome,
            "recordId": record_id,
            "recordType": table.map(|_| "baptism"),
            "table": table,
            "error": null,
        })
    }

    fn results(rows: Vec<Value>) -> Value {
        json!({
            "method": "autocommit_v1",
            "batch_id": "test-batch-001",
            "job_id": 42,
            "church_id": 46,
            "rows": rows,
            "created_at": "2026-02-27T12:00:00Z",
        })
    }

    fn assert_count_invariant(plan: &RollbackPlan) {
        let grouped: usize = plan.by_table().iter().map(|(_, ids)| ids.len()).sum();
        assert_eq!(plan.total_targets(), plan.targets().len());
        assert_eq!(plan.total_targets(), grouped);
    }

    #[rstest]
    fn committed_rows_only_become_targets(batch_id: BatchId) {
        let artifact = results(vec![
            row(0, "committed", Some(100), Some("baptism_records")),
            row(1, "skipped", None, None),
            row(2, "committed", Some(101), Some("baptism_records")),
            row(3, "error", None, None),
        ]);

        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        assert_eq!(plan.method(), "autocommit_rollback_v1");
        assert_eq!(plan.batch_id(), &batch_id);
        assert_eq!(plan.total_targets(), 2);
        let ids: Vec<_> = plan.targets().iter().map(|t| t.record_id).collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(plan.by_table().get("baptism_records"), Some(&vec![100, 101]));
        assert_eq!(plan.by_table().len(), 1);
        assert_count_invariant(&plan);
    }

    #[rstest]
    fn tables_are_grouped_in_first_seen_order(batch_id: BatchId) {
        let artifact = results(vec![
            row(0, "committed", Some(200), Some("marriage_records")),
            row(1, "committed", Some(100), Some("baptism_records")),
            row(2, "committed", Some(201), Some("marriage_records")),
            row(3, "committed", Some(300), Some("funeral_records")),
        ]);

        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        let tables: Vec<_> = plan.by_table().tables().map(TableName::as_str).collect();
        assert_eq!(
            tables,
            vec!["marriage_records", "baptism_records", "funeral_records"]
        );
        assert_eq!(plan.by_table().get("marriage_records"), Some(&vec![200, 201]));
        assert_count_invariant(&plan);
    }

    #[rstest]
    fn committed_rows_missing_id_or_table_are_excluded(batch_id: BatchId) {
        let artifact = json!({
            "rows": [
                { "candidateIndex": 0, "outcome": "committed", "recordId": 100, "table": "baptism_records" },
                { "candidateIndex": 1, "outcome": "committed", "recordId": null, "table": "baptism_records" },
                { "candidateIndex": 2, "outcome": "committed", "recordId": 102, "table": null },
                { "candidateIndex": 3, "outcome": "committed", "recordId": 103, "table": "" },
                { "candidateIndex": 4, "outcome": "committed", "table": "baptism_records" },
            ]
        });

        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        assert_eq!(plan.total_targets(), 1);
        assert_eq!(plan.targets()[0].record_id, 100);
        assert_count_invariant(&plan);
    }

    #[rstest]
    fn numeric_string_ids_are_targets(batch_id: BatchId) {
        let artifact = json!({
            "rows": [
                { "candidateIndex": 0, "outcome": "committed", "recordId": "101", "table": "baptism_records" },
                { "candidateIndex": 1, "outcome": "committed", "recordId": 102, "table": "baptism_records" },
            ]
        });

        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        assert_eq!(plan.total_targets(), 2);
        assert_eq!(plan.by_table().get("baptism_records"), Some(&vec![101, 102]));
        assert_count_invariant(&plan);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(json!({ "rows": null })))]
    #[case(Some(json!({ "rows": "oops" })))]
    #[case(Some(json!(null)))]
    fn absent_or_malformed_input_yields_empty_plan(
        batch_id: BatchId,
        #[case] artifact: Option<Value>,
    ) {
        let plan = extract_rollback_targets(artifact.as_ref(), &batch_id);
        assert_eq!(plan.total_targets(), 0);
        assert!(plan.by_table().is_empty());
    }

    #[rstest]
    fn all_skipped_rows_yield_no_targets(batch_id: BatchId) {
        let artifact = results(vec![row(0, "skipped", None, None), row(1, "skipped", None, None)]);
        assert!(extract_rollback_targets(Some(&artifact), &batch_id).is_empty());
    }

    #[rstest]
    fn duplicate_ids_are_kept_per_row(batch_id: BatchId) {
        let artifact = results(vec![
            row(0, "committed", Some(100), Some("baptism_records")),
            row(1, "committed", Some(100), Some("baptism_records")),
        ]);

        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        assert_eq!(plan.by_table().get("baptism_records"), Some(&vec![100, 100]));
        assert_count_invariant(&plan);
    }

    #[rstest]
    fn extraction_is_deterministic(batch_id: BatchId) {
        let artifact = results(vec![
            row(0, "committed", Some(100), Some("baptism_records")),
            row(1, "committed", Some(200), Some("marriage_records")),
        ]);

        let first = extract_rollback_targets(Some(&artifact), &batch_id);
        let second = extract_rollback_targets(Some(&artifact), &batch_id);
        assert_eq!(first, second);
    }

    #[rstest]
    fn plan_serialises_with_wire_field_names(batch_id: BatchId) {
        let artifact = results(vec![row(0, "committed", Some(100), Some("baptism_records"))]);
        let plan = extract_rollback_targets(Some(&artifact), &batch_id);

        let value = serde_json::to_value(&plan).expect("serialise plan");
        assert_eq!(
            value,
            json!({
                "method": "autocommit_rollback_v1",
                "batch_id": "test-batch-001",
                "targets": [
                    { "recordId": 100, "table": "baptism_records", "recordType": "baptism" }
                ],
                "by_table": { "baptism_records": [100] },
                "total_targets": 1
            })
        );
    }
}
