//! Diesel table definitions matching `backend/migrations`.
//!
//! Record tables (`baptism_records` and friends) are addressed dynamically by
//! name and therefore have no entry here.

diesel::table! {
    /// Auto-commit batches and their rollback artifacts.
    ///
    /// `plan` and `results` hold the commit process's `autocommit_plan` and
    /// `autocommit_results` artifacts, and
    /// `rollback` the most recent rollback result, both as JSONB.
    ocr_commit_batches (batch_id) {
        batch_id -> Text,
        church_id -> Int8,
        job_id -> Int8,
        plan -> Nullable<Jsonb>,
        results -> Nullable<Jsonb>,
        rollback -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        rolled_back_at -> Nullable<Timestamptz>,
    }
}
