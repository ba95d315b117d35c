//! Table metadata: key schema and observed attribute names.

use std::collections::BTreeSet;

/// Key schema for a table.
///
/// The partition key is mandatory; the sort key is optional. Only the names
/// matter to the browsing/editing core — key types are the store's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Partition (hash) key attribute name.
    pub partition_key: String,
    /// Optional sort (range) key attribute name.
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// Returns `true` if `name` is one of the key attributes.
    #[must_use]
    pub fn is_key(&self, name: &str) -> bool {
        self.partition_key == name || self.sort_key.as_deref() == Some(name)
    }
}

/// Metadata for a single table, produced by a describe call.
///
/// Created once per description and immutable thereafter; result sets share
/// it by reference counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// The table name.
    pub name: String,
    /// The table's key schema.
    pub keys: KeySchema,
    /// Attribute names observed across a sample of items, in canonical
    /// column order (partition key, sort key, remainder alphabetical).
    pub defined_attributes: Vec<String>,
}

/// Arranges a set of attribute names into canonical column order: partition
/// key first, sort key second (when the table has one), then the remaining
/// names alphabetically, with no duplicates.
///
/// Key attributes appear even when absent from `names` so that the column
/// invariant holds for empty result sets.
#[must_use]
pub fn ordered_column_names(keys: &KeySchema, names: BTreeSet<String>) -> Vec<String> {
    let mut columns = Vec::with_capacity(names.len() + 2);
    columns.push(keys.partition_key.clone());
    if let Some(sort_key) = &keys.sort_key {
        columns.push(sort_key.clone());
    }
    // BTreeSet iteration is already alphabetical.
    for name in names {
        if !keys.is_key(&name) {
            columns.push(name);
        }
    }
    columns
}
