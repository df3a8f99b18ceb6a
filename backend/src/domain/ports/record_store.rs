//! Port for the sacramental record tables a batch wrote into.

use async_trait::async_trait;

use crate::domain::rollback::{RecordId, TableName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "record store connection failed: {message}",
        /// Query or deletion failed during execution.
        Query { message: String } =>
            "record store query failed: {message}",
        /// The table name cannot be addressed safely.
        UnsupportedTable { table: String } =>
            "record store does not support table {table}",
    }
}

/// Port for existence checks and deletions by record ID.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return the subset of `ids` still present in `table`.
    async fn existing_ids(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<Vec<RecordId>, RecordStoreError>;

    /// Delete `ids` from `table`, returning how many rows were removed.
    ///
    /// IDs that are already gone are ignored.
    async fn delete_records(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<u64, RecordStoreError>;
}

/// Fixture implementation for tests that hold no records.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecordStore;

#[async_trait]
impl RecordStore for FixtureRecordStore {
    async fn existing_ids(
        &self,
        _table: &TableName,
        _ids: &[RecordId],
    ) -> Result<Vec<RecordId>, RecordStoreError> {
        Ok(Vec::new())
    }

    async fn delete_records(
        &self,
        _table: &TableName,
        _ids: &[RecordId],
    ) -> Result<u64, RecordStoreError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_nothing_present() {
        let store = FixtureRecordStore;
        let table = TableName::new("baptism_records");

        let existing = store
            .existing_ids(&table, &[100, 101])
            .await
            .expect("fixture lookup succeeds");
        let deleted = store
            .delete_records(&table, &[100])
            .await
            .expect("fixture delete succeeds");

        assert!(existing.is_empty());
        assert_eq!(deleted, 0);
    }

    #[rstest]
    fn unsupported_table_names_the_table() {
        let err = RecordStoreError::unsupported_table("records; drop");
        assert_eq!(err.to_string(), "record store does not support table records; drop");
    }
}
