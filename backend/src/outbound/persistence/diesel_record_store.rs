//! PostgreSQL-backed `RecordStore` over dynamically named record tables.
//!
//! Table names cannot be bound as parameters, so they are validated as plain
//! identifiers and double-quoted before being spliced into the statement.
//! Record IDs are always bound.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::rollback::{RecordId, TableName};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::RecordIdRow;
use super::pool::DbPool;

/// Diesel-backed implementation of the record store port.
#[derive(Clone)]
pub struct DieselRecordStore {
    pool: DbPool,
}

impl DieselRecordStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn quoted_table(table: &TableName) -> Result<String, RecordStoreError> {
    if !table.is_sql_identifier() {
        return Err(RecordStoreError::unsupported_table(table.as_str()));
    }
    Ok(format!("\"{table}\""))
}

/// The cast lets INT4 and INT8 keys both decode as `BigInt`.
fn select_existing_sql(table: &TableName) -> Result<String, RecordStoreError> {
    Ok(format!(
        "SELECT id::int8 AS id FROM {} WHERE id = ANY($1)",
        quoted_table(table)?
    ))
}

fn delete_sql(table: &TableName) -> Result<String, RecordStoreError> {
    Ok(format!("DELETE FROM {} WHERE id = ANY($1)", quoted_table(table)?))
}

#[async_trait]
impl RecordStore for DieselRecordStore {
    async fn existing_ids(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<Vec<RecordId>, RecordStoreError> {
        let sql = select_existing_sql(table)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecordIdRow> = sql_query(sql)
            .bind::<Array<BigInt>, _>(ids)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "check record existence"))?;

        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn delete_records(
        &self,
        table: &TableName,
        ids: &[RecordId],
    ) -> Result<u64, RecordStoreError> {
        let sql = delete_sql(table)?;
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = sql_query(sql)
            .bind::<Array<BigInt>, _>(ids)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete records"))?;

        u64::try_from(deleted)
            .map_err(|_| RecordStoreError::query("deleted row count exceeds supported range"))
    }
}
