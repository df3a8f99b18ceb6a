//! Identifier newtypes shared by the rollback pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a persisted church record.
pub type RecordId = i64;

/// Validation errors returned by [`BatchId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchIdValidationError {
    /// The identifier was empty or whitespace only.
    #[error("batch id must not be empty")]
    Empty,
}

/// Opaque identifier of one auto-commit batch.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::BatchId;
///
/// let id = BatchId::new("batch-2026-02-27").expect("valid batch id");
/// assert_eq!(id.as_str(), "batch-2026-02-27");
/// assert!(BatchId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchId(String);

impl BatchId {
    /// Validate and construct a batch identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, BatchIdValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BatchIdValidationError::Empty);
        }
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for BatchId {
    type Error = BatchIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BatchId> for String {
    fn from(value: BatchId) -> Self {
        value.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the table a committed record was written to.
///
/// Table names come from the upstream commit process and are compared with
/// exact string equality. The core never checks them against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Wrap a table name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the table name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the name is a plain, unquoted SQL identifier.
    ///
    /// # Examples
    /// ```
    /// use records_backend::domain::rollback::TableName;
    ///
    /// assert!(TableName::new("baptism_records").is_sql_identifier());
    /// assert!(!TableName::new("records; drop table users").is_sql_identifier());
    /// ```
    pub fn is_sql_identifier(&self) -> bool {
        let mut chars = self.0.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl From<&str> for TableName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TableName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
