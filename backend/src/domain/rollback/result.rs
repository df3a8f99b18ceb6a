//! Rollback result: the durable audit artifact of one rollback invocation.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::{BatchId, ROLLBACK_METHOD, RecordId, RollbackVerification, TableMap};

/// Identity and caller context stamped onto a rollback result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackContext {
    /// Batch being rolled back.
    pub batch_id: BatchId,
    /// OCR job that produced the batch.
    pub job_id: i64,
    /// Church (tenant) owning the records.
    pub church_id: i64,
    /// Operator who requested the rollback.
    pub rolled_back_by: String,
    /// Whether the operator chose to proceed despite missing records.
    pub force: bool,
}

/// Persisted record of one rollback.
///
/// The field names and nesting form the stored audit format read by existing
/// consumers; `rolled_back_at` is an RFC 3339 UTC string with millisecond
/// precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackResult {
    method: String,
    batch_id: BatchId,
    job_id: i64,
    church_id: i64,
    deleted: TableMap<usize>,
    missing: TableMap<usize>,
    deleted_ids: TableMap<Vec<RecordId>>,
    missing_ids: TableMap<Vec<RecordId>>,
    total_deleted: usize,
    total_missing: usize,
    rolled_back_by: String,
    #[serde(with = "millis_timestamp")]
    rolled_back_at: DateTime<Utc>,
    force: bool,
}

impl RollbackResult {
    /// Artifact method tag, always `autocommit_rollback_v1`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Batch that was rolled back.
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// OCR job that produced the batch.
    pub fn job_id(&self) -> i64 {
        self.job_id
    }

    /// Church owning the records.
    pub fn church_id(&self) -> i64 {
        self.church_id
    }

    /// Per-table count of deleted records.
    pub fn deleted(&self) -> &TableMap<usize> {
        &self.deleted
    }

    /// Per-table count of records that were already gone.
    pub fn missing(&self) -> &TableMap<usize> {
        &self.missing
    }

    /// Deleted record IDs per table.
    pub fn deleted_ids(&self) -> &TableMap<Vec<RecordId>> {
        &self.deleted_ids
    }

    /// Already-gone record IDs per table.
    pub fn missing_ids(&self) -> &TableMap<Vec<RecordId>> {
        &self.missing_ids
    }

    /// Total deleted records.
    pub fn total_deleted(&self) -> usize {
        self.total_deleted
    }

    /// Total records that were already gone.
    pub fn total_missing(&self) -> usize {
        self.total_missing
    }

    /// Operator who ran the rollback.
    pub fn rolled_back_by(&self) -> &str {
        &self.rolled_back_by
    }

    /// When the result was built.
    pub fn rolled_back_at(&self) -> DateTime<Utc> {
        self.rolled_back_at
    }

    /// Whether the rollback was forced past missing records.
    pub fn force(&self) -> bool {
        self.force
    }
}

/// Package a verification into the audit artifact.
///
/// Counts and ID lists are copied as-is; nothing is re-validated, so an
/// inconsistent verification shows up unchanged in the result.
///
/// # Examples
/// ```
/// use mockable::DefaultClock;
/// use records_backend::domain::rollback::{
///     BatchId, ExistenceSnapshot, RollbackContext, build_rollback_result,
///     extract_rollback_targets, verify_targets,
/// };
/// use serde_json::json;
///
/// let batch_id = BatchId::new("b-1").expect("valid batch id");
/// let results = json!({ "rows": [
///     { "outcome": "committed", "recordId": 100, "table": "baptism_records" },
/// ]});
/// let plan = extract_rollback_targets(Some(&results), &batch_id);
/// let verification = verify_targets(&plan, &ExistenceSnapshot::new());
///
/// let context = RollbackContext {
///     batch_id,
///     job_id: 42,
///     church_id: 46,
///     rolled_back_by: "admin@example.org".to_owned(),
///     force: true,
/// };
/// let result = build_rollback_result(&verification, context, &DefaultClock);
/// assert_eq!(result.total_missing(), 1);
/// assert!(result.force());
/// ```
pub fn build_rollback_result(
    verification: &RollbackVerification,
    context: RollbackContext,
    clock: &dyn Clock,
) -> RollbackResult {
    let RollbackContext {
        batch_id,
        job_id,
        church_id,
        rolled_back_by,
        force,
    } = context;

    RollbackResult {
        method: ROLLBACK_METHOD.to_owned(),
        batch_id,
        job_id,
        church_id,
        deleted: verification.deleted_counts().clone(),
        missing: verification.missing_counts().clone(),
        deleted_ids: verification.existing().clone(),
        missing_ids: verification.missing().clone(),
        total_deleted: verification.total_existing(),
        total_missing: verification.total_missing(),
        rolled_back_by,
        rolled_back_at: clock.utc(),
        force,
    }
}

mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rollback::{ExistenceSnapshot, extract_rollback_targets, verify_targets};
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};
    use serde_json::json;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 2, 27, 12, 30, 0)
                .single()
                .expect("valid fixture timestamp")
        }
    }

    #[fixture]
    fn partial_verification() -> RollbackVerification {
        let batch_id = BatchId::new("test-batch-009").expect("valid batch id");
        let results = json!({ "rows": [
            { "outcome": "committed", "recordId": 100, "table": "baptism_records" },
            { "outcome": "committed", "recordId": 101, "table": "baptism_records" },
        ]});
        let plan = extract_rollback_targets(Some(&results), &batch_id);
        let snapshot: ExistenceSnapshot = [("baptism_records", vec![100])].into_iter().collect();
        verify_targets(&plan, &snapshot)
    }

    fn context(force: bool) -> RollbackContext {
        RollbackContext {
            batch_id: BatchId::new("test-batch-009").expect("valid batch id"),
            job_id: 42,
            church_id: 46,
            rolled_back_by: "admin@test.com".to_owned(),
            force,
        }
    }

    #[rstest]
    fn result_copies_verification_and_context(partial_verification: RollbackVerification) {
        let result = build_rollback_result(&partial_verification, context(false), &FixtureClock);

        assert_eq!(result.method(), "autocommit_rollback_v1");
        assert_eq!(result.batch_id().as_str(), "test-batch-009");
        assert_eq!(result.job_id(), 42);
        assert_eq!(result.church_id(), 46);
        assert_eq!(result.total_deleted(), 1);
        assert_eq!(result.total_missing(), 1);
        assert_eq!(result.deleted_ids().get("baptism_records"), Some(&vec![100]));
        assert_eq!(result.missing_ids().get("baptism_records"), Some(&vec![101]));
        assert_eq!(result.rolled_back_by(), "admin@test.com");
        assert!(!result.force());
        assert_eq!(result.rolled_back_at(), FixtureClock.utc());
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn force_flag_passes_through(partial_verification: RollbackVerification, #[case] force: bool) {
        let result = build_rollback_result(&partial_verification, context(force), &FixtureClock);
        assert_eq!(result.force(), force);
    }

    #[rstest]
    fn result_serialises_to_audit_shape(partial_verification: RollbackVerification) {
        let result = build_rollback_result(&partial_verification, context(false), &FixtureClock);

        let value = serde_json::to_value(&result).expect("serialise result");
        assert_eq!(
            value,
            json!({
                "method": "autocommit_rollback_v1",
                "batch_id": "test-batch-009",
                "job_id": 42,
                "church_id": 46,
                "deleted": { "baptism_records": 1 },
                "missing": { "baptism_records": 1 },
                "deleted_ids": { "baptism_records": [100] },
                "missing_ids": { "baptism_records": [101] },
                "total_deleted": 1,
                "total_missing": 1,
                "rolled_back_by": "admin@test.com",
                "rolled_back_at": "2026-02-27T12:30:00.000Z",
                "force": false
            })
        );
        assert!(value["rolled_back_at"].is_string());
    }

    #[rstest]
    fn stored_result_reads_back(partial_verification: RollbackVerification) {
        let result = build_rollback_result(&partial_verification, context(true), &FixtureClock);
        let stored = serde_json::to_string(&result).expect("serialise result");

        let restored: RollbackResult = serde_json::from_str(&stored).expect("deserialise result");
        assert_eq!(restored, result);
    }
}
