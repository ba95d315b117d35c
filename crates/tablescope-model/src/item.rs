//! The item type: a named collection of attribute values.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::table::TableInfo;

/// A single row of a table: a mapping from attribute name to value.
///
/// Cloning an item clones the mapping; the values themselves are treated as
/// immutable once constructed, so edits always replace a value rather than
/// mutating it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(HashMap<String, AttributeValue>);

impl Item {
    /// Creates an empty item.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Extracts the key attributes of this item according to the table's key
    /// schema, suitable for a delete or direct lookup.
    ///
    /// Missing key attributes are simply absent from the returned map; the
    /// write path validates key presence before any store operation.
    #[must_use]
    pub fn key_value(&self, info: &TableInfo) -> HashMap<String, AttributeValue> {
        let mut key = HashMap::new();
        if let Some(v) = self.0.get(&info.keys.partition_key) {
            key.insert(info.keys.partition_key.clone(), v.clone());
        }
        if let Some(sort_key) = &info.keys.sort_key {
            if let Some(v) = self.0.get(sort_key) {
                key.insert(sort_key.clone(), v.clone());
            }
        }
        key
    }

    /// Best-effort textual rendering of a top-level attribute.
    ///
    /// Returns `None` if the attribute is absent or has no single-line form.
    #[must_use]
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(AttributeValue::as_text)
    }
}

impl Deref for Item {
    type Target = HashMap<String, AttributeValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Item {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, AttributeValue)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(map: HashMap<String, AttributeValue>) -> Self {
        Self(map)
    }
}
