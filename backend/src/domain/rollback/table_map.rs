//! Insertion-ordered map keyed by table name.
//!
//! Rollback artifacts group IDs per table and are shown to operators in the
//! order tables were first seen in the source batch. A `BTreeMap` would sort
//! them and a `HashMap` would shuffle them, so the map keeps a small vector of
//! entries instead. Batches touch a handful of tables, so lookups stay linear.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TableName;

/// Map from [`TableName`] to `V` that remembers first-insertion order.
///
/// Serialises as a JSON object whose keys appear in insertion order.
///
/// # Examples
/// ```
/// use records_backend::domain::rollback::{TableMap, TableName};
///
/// let mut ids: TableMap<Vec<i64>> = TableMap::new();
/// ids.entry_or_default(&TableName::new("marriage_records")).push(200);
/// ids.entry_or_default(&TableName::new("baptism_records")).push(100);
///
/// let json = serde_json::to_string(&ids).expect("serialise");
/// assert_eq!(json, r#"{"marriage_records":[200],"baptism_records":[100]}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMap<V> {
    entries: Vec<(TableName, V)>,
}

impl<V> Default for TableMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> TableMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value stored for `table`.
    pub fn get(&self, table: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(name, _)| name.as_str() == table)
            .map(|(_, value)| value)
    }

    /// Whether `table` has an entry.
    pub fn contains_table(&self, table: &str) -> bool {
        self.get(table).is_some()
    }

    /// Insert or replace the value for `table`, returning the previous value.
    ///
    /// Replacing keeps the table's original position.
    pub fn insert(&mut self, table: TableName, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(name, _)| *name == table) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((table, value));
                None
            }
        }
    }

    /// Mutable access to the value for `table`, inserting `V::default()` at the
    /// end of the map when the table is new.
    pub fn entry_or_default(&mut self, table: &TableName) -> &mut V
    where
        V: Default,
    {
        let index = match self.entries.iter().position(|(name, _)| name == table) {
            Some(index) => index,
            None => {
                self.entries.push((table.clone(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Iterate over `(table, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &V)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    /// Iterate over table names in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &TableName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Build a new map with the same tables, in the same order.
    pub fn map_values<U>(&self, mut f: impl FnMut(&V) -> U) -> TableMap<U> {
        TableMap {
            entries: self
                .entries
                .iter()
                .map(|(name, value)| (name.clone(), f(value)))
                .collect(),
        }
    }
}

impl<V> FromIterator<(TableName, V)> for TableMap<V> {
    fn from_iter<I: IntoIterator<Item = (TableName, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (table, value) in iter {
            map.insert(table, value);
        }
        map
    }
}

impl<V> IntoIterator for TableMap<V> {
    type Item = (TableName, V);
    type IntoIter = std::vec::IntoIter<(TableName, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for TableMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

struct TableMapVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for TableMapVisitor<V> {
    type Value = TableMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map keyed by table name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = TableMap::new();
        while let Some((table, value)) = access.next_entry::<TableName, V>()? {
            map.insert(table, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TableMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableMapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table(name: &str) -> TableName {
        TableName::new(name)
    }

    #[rstest]
    fn insert_replaces_in_place() {
        let mut map = TableMap::new();
        map.insert(table("a"), 1);
        map.insert(table("b"), 2);
        let previous = map.insert(table("a"), 3);

        assert_eq!(previous, Some(1));
        let pairs: Vec<_> = map.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        assert_eq!(pairs, vec![("a", 3), ("b", 2)]);
    }

    #[rstest]
    fn entry_or_default_appends_new_tables() {
        let mut map: TableMap<Vec<i64>> = TableMap::new();
        map.entry_or_default(&table("funeral_records")).push(3);
        map.entry_or_default(&table("baptism_records")).push(1);
        map.entry_or_default(&table("funeral_records")).push(4);

        let tables: Vec<_> = map.tables().map(TableName::as_str).collect();
        assert_eq!(tables, vec!["funeral_records", "baptism_records"]);
        assert_eq!(map.get("funeral_records"), Some(&vec![3, 4]));
    }

    #[rstest]
    fn deserialisation_preserves_document_order() {
        let map: TableMap<u64> =
            serde_json::from_str(r#"{"zeta":1,"alpha":2}"#).expect("valid map");
        let tables: Vec<_> = map.tables().map(TableName::as_str).collect();
        assert_eq!(tables, vec!["zeta", "alpha"]);
    }

    #[rstest]
    fn map_values_keeps_order() {
        let map: TableMap<Vec<i64>> = [(table("b"), vec![1, 2]), (table("a"), vec![])]
            .into_iter()
            .collect();
        let counts = map.map_values(Vec::len);
        let pairs: Vec<_> = counts.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        assert_eq!(pairs, vec![("b", 2), ("a", 0)]);
    }
}
