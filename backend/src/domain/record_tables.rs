//! Allow-list of record tables a rollback may touch.

use super::rollback::{RollbackPlan, TableName};

/// Tables created by the auto-commit process, in configuration order.
///
/// Rollback only queries and deletes from tables listed here; a batch
/// artifact naming any other table is rejected before storage is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTables {
    tables: Vec<TableName>,
}

impl RecordTables {
    /// Tables allowed when nothing else is configured.
    pub const DEFAULT_LIST: &'static str = "baptism_records,marriage_records,funeral_records";

    /// Build an allow-list from table names, dropping duplicates.
    pub fn new<T: Into<TableName>>(tables: impl IntoIterator<Item = T>) -> Self {
        let mut unique: Vec<TableName> = Vec::new();
        for table in tables.into_iter().map(Into::into) {
            if !unique.contains(&table) {
                unique.push(table);
            }
        }
        Self { tables: unique }
    }

    /// Parse a comma-separated list, ignoring blank entries.
    ///
    /// # Examples
    /// ```
    /// use records_backend::domain::RecordTables;
    /// use records_backend::domain::rollback::TableName;
    ///
    /// let tables = RecordTables::parse_list(" baptism_records, ,funeral_records ");
    /// assert!(tables.contains(&TableName::new("funeral_records")));
    /// assert_eq!(tables.iter().count(), 2);
    /// ```
    pub fn parse_list(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|table| !table.is_empty()),
        )
    }

    /// Whether `table` is allowed.
    pub fn contains(&self, table: &TableName) -> bool {
        self.tables.contains(table)
    }

    /// Iterate the allowed tables.
    pub fn iter(&self) -> impl Iterator<Item = &TableName> {
        self.tables.iter()
    }

    /// Plan tables that are not allowed, in plan order.
    pub fn unknown_in<'a>(&self, plan: &'a RollbackPlan) -> Vec<&'a TableName> {
        plan.by_table()
            .tables()
            .filter(|table| !self.contains(table))
            .collect()
    }
}

impl Default for RecordTables {
    fn default() -> Self {
        Self::parse_list(Self::DEFAULT_LIST)
    }
}
