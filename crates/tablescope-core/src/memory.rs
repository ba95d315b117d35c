//! In-memory store provider.
//!
//! A conforming [`TableProvider`] backend used by tests and local work.
//! Tables are held in a [`DashMap`]; within a table, rows live in a
//! [`BTreeMap`] keyed by a sortable key wrapper so scans iterate in key
//! order (string keys by UTF-8 bytes, number keys numerically, binary keys
//! byte-by-byte; a sentinel stands in when the table has no sort key).
//!
//! Every write stamps the row with a wall-clock timestamp, which is what
//! makes the no-edit "touch" operation observable.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use tablescope_model::table::ordered_column_names;
use tablescope_model::{AttributeValue, Item, KeySchema, TableInfo};

use crate::expression::Condition;
use crate::provider::{ProviderError, TableProvider};

/// Upper bound on the number of rows sampled for attribute names during a
/// describe call.
const DESCRIBE_SAMPLE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Sortable key values
// ---------------------------------------------------------------------------

/// A key-eligible attribute value wrapped for use as a `BTreeMap` key.
#[derive(Debug, Clone)]
enum KeyValue {
    S(String),
    N(String),
    B(bytes::Bytes),
    /// Stands in for the sort key when the table has none.
    Sentinel,
}

impl KeyValue {
    fn from_attribute(attr_name: &str, value: &AttributeValue) -> Result<Self, ProviderError> {
        match value {
            AttributeValue::S(s) => Ok(Self::S(s.clone())),
            AttributeValue::N(n) => Ok(Self::N(n.clone())),
            AttributeValue::B(b) => Ok(Self::B(b.clone())),
            other => Err(ProviderError::InvalidItem {
                message: format!(
                    "key attribute '{attr_name}' has type {}, expected S, N, or B",
                    other.type_descriptor()
                ),
            }),
        }
    }
}

/// Numbers that fail to parse sort to the end.
fn parse_number(s: &str) -> f64 {
    s.parse::<f64>().unwrap_or(f64::NAN)
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::S(a), Self::S(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::N(a), Self::N(b)) => {
                let fa = parse_number(a);
                let fb = parse_number(b);
                fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
            }
            (Self::B(a), Self::B(b)) => a.as_ref().cmp(b.as_ref()),
            (Self::Sentinel, Self::Sentinel) => Ordering::Equal,
            // Mixed variants should not appear within one table, but the
            // ordering must still be total.
            (Self::S(_), _) => Ordering::Less,
            (_, Self::S(_)) => Ordering::Greater,
            (Self::N(_), _) => Ordering::Less,
            (_, Self::N(_)) => Ordering::Greater,
            (Self::B(_), _) => Ordering::Less,
            (_, Self::B(_)) => Ordering::Greater,
        }
    }
}

/// The primary key of a stored row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    partition: KeyValue,
    sort: KeyValue,
}

impl RowKey {
    fn from_attributes(
        keys: &KeySchema,
        attributes: &HashMap<String, AttributeValue>,
    ) -> Result<Self, ProviderError> {
        let partition = attributes
            .get(&keys.partition_key)
            .ok_or_else(|| ProviderError::InvalidItem {
                message: format!("missing key attribute '{}'", keys.partition_key),
            })
            .and_then(|v| KeyValue::from_attribute(&keys.partition_key, v))?;

        let sort = match &keys.sort_key {
            Some(sort_key) => attributes
                .get(sort_key)
                .ok_or_else(|| ProviderError::InvalidItem {
                    message: format!("missing key attribute '{sort_key}'"),
                })
                .and_then(|v| KeyValue::from_attribute(sort_key, v))?,
            None => KeyValue::Sentinel,
        };

        Ok(Self { partition, sort })
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredRow {
    item: Item,
    written_at: DateTime<Utc>,
}

#[derive(Debug)]
struct MemoryTable {
    keys: KeySchema,
    rows: RwLock<BTreeMap<RowKey, StoredRow>>,
}

/// In-memory [`TableProvider`] implementation.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    tables: DashMap<String, MemoryTable>,
}

impl MemoryProvider {
    /// Creates an empty provider with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the given key schema. Replaces any existing
    /// table of the same name.
    pub fn create_table(&self, name: impl Into<String>, keys: KeySchema) {
        let name = name.into();
        debug!(table = %name, "creating table");
        self.tables.insert(
            name,
            MemoryTable {
                keys,
                rows: RwLock::new(BTreeMap::new()),
            },
        );
    }

    /// The timestamp of the last write to the row addressed by `key`, if
    /// the table and row exist.
    #[must_use]
    pub fn last_written_at(
        &self,
        name: &str,
        key: &HashMap<String, AttributeValue>,
    ) -> Option<DateTime<Utc>> {
        let table = self.tables.get(name)?;
        let row_key = RowKey::from_attributes(&table.keys, key).ok()?;
        let rows = table.rows.read();
        rows.get(&row_key).map(|row| row.written_at)
    }

    fn with_table<T>(
        &self,
        name: &str,
        f: impl FnOnce(&MemoryTable) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| ProviderError::TableNotFound {
                name: name.to_owned(),
            })?;
        f(&table)
    }
}

#[async_trait]
impl TableProvider for MemoryProvider {
    async fn list_tables(&self) -> Result<Vec<String>, ProviderError> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn describe_table(&self, name: &str) -> Result<TableInfo, ProviderError> {
        self.with_table(name, |table| {
            let rows = table.rows.read();
            let names: BTreeSet<String> = rows
                .values()
                .take(DESCRIBE_SAMPLE_SIZE)
                .flat_map(|row| row.item.keys().cloned())
                .collect();
            Ok(TableInfo {
                name: name.to_owned(),
                keys: table.keys.clone(),
                defined_attributes: ordered_column_names(&table.keys, names),
            })
        })
    }

    async fn scan_items(
        &self,
        name: &str,
        filter: Option<&Condition>,
        max_items: Option<usize>,
    ) -> Result<Vec<Item>, ProviderError> {
        self.with_table(name, |table| {
            let rows = table.rows.read();
            let cap = max_items.unwrap_or(usize::MAX);
            let items: Vec<Item> = rows
                .values()
                .filter(|row| filter.is_none_or(|cond| cond.matches(&row.item)))
                .take(cap)
                .map(|row| row.item.clone())
                .collect();
            debug!(table = %name, count = items.len(), "scanned items");
            Ok(items)
        })
    }

    async fn put_item(&self, name: &str, item: Item) -> Result<(), ProviderError> {
        self.with_table(name, |table| {
            let key = RowKey::from_attributes(&table.keys, &item)?;
            table.rows.write().insert(
                key,
                StoredRow {
                    item,
                    written_at: Utc::now(),
                },
            );
            Ok(())
        })
    }

    async fn put_items(&self, name: &str, items: Vec<Item>) -> Result<(), ProviderError> {
        self.with_table(name, |table| {
            let mut rows = table.rows.write();
            for item in items {
                // Fire-and-continue: an item that fails key extraction is
                // logged and skipped, the rest of the batch still lands.
                match RowKey::from_attributes(&table.keys, &item) {
                    Ok(key) => {
                        rows.insert(
                            key,
                            StoredRow {
                                item,
                                written_at: Utc::now(),
                            },
                        );
                    }
                    Err(err) => {
                        warn!(table = %name, error = %err, "skipping item in bulk put");
                    }
                }
            }
            Ok(())
        })
    }

    async fn delete_item(
        &self,
        name: &str,
        key: HashMap<String, AttributeValue>,
    ) -> Result<(), ProviderError> {
        self.with_table(name, |table| {
            let row_key = RowKey::from_attributes(&table.keys, &key)?;
            table.rows.write().remove(&row_key);
            Ok(())
        })
    }
}
