//! Read-only view of an auto-commit results artifact.
//!
//! The upstream commit process writes a loosely shaped JSON document per
//! batch. Only the per-row fields the rollback needs are lifted out of it;
//! anything of the wrong shape becomes `None` on that row instead of failing
//! the whole artifact.

use serde_json::Value;

use super::RecordId;

/// Classification the commit process recorded for one candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The row was written to a record table.
    Committed,
    /// The row was not eligible for auto-commit.
    Skipped,
    /// Writing the row failed.
    Error,
}

impl CommitOutcome {
    /// Parse the wire label used in results artifacts.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "committed" => Some(Self::Committed),
            "skipped" => Some(Self::Skipped),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One candidate row of a commit batch, as far as it could be read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitBatchRow {
    /// Position of the candidate in the source page.
    pub candidate_index: Option<u64>,
    /// Recorded outcome; `None` when absent or unrecognised.
    pub outcome: Option<CommitOutcome>,
    /// Identifier of the persisted record.
    pub record_id: Option<RecordId>,
    /// Table the record was written to.
    pub table: Option<String>,
    /// Record type label such as `baptism`.
    pub record_type: Option<String>,
}

impl CommitBatchRow {
    fn from_json(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };
        Self {
            candidate_index: fields.get("candidateIndex").and_then(Value::as_u64),
            outcome: fields
                .get("outcome")
                .and_then(Value::as_str)
                .and_then(CommitOutcome::from_label),
            record_id: fields.get("recordId").and_then(record_id_field),
            table: fields.get("table").and_then(table_field),
            record_type: string_field(fields.get("recordType")),
        }
    }
}

/// Integer IDs, also when a driver rendered them as decimal strings.
fn record_id_field(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Any non-empty scalar names a table; numbers are kept in their JSON form.
fn table_field(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number)
            if number
                .as_f64()
                .is_some_and(|value| value.is_normal() || value.is_subnormal()) =>
        {
            Some(number.to_string())
        }
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

/// Rows of one commit batch.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::{CommitBatchArtifact, CommitOutcome};
/// use serde_json::json;
///
/// let artifact = CommitBatchArtifact::from(&json!({
///     "rows": [{ "outcome": "committed", "recordId": 7, "table": "baptism_records" }],
///     "committed_count": 1
/// }));
/// assert_eq!(artifact.rows().len(), 1);
/// assert_eq!(artifact.rows()[0].outcome, Some(CommitOutcome::Committed));
///
/// let malformed = CommitBatchArtifact::from(&json!({ "rows": "not-a-list" }));
/// assert!(malformed.rows().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitBatchArtifact {
    rows: Vec<CommitBatchRow>,
}

impl CommitBatchArtifact {
    /// Build an artifact from already-parsed rows.
    pub fn new(rows: Vec<CommitBatchRow>) -> Self {
        Self { rows }
    }

    /// Rows in source order.
    pub fn rows(&self) -> &[CommitBatchRow] {
        &self.rows
    }
}

impl From<&Value> for CommitBatchArtifact {
    fn from(value: &Value) -> Self {
        let rows = value
            .get("rows")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(CommitBatchRow::from_json).collect())
            .unwrap_or_default();
        Self { rows }
    }
}
