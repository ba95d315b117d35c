//! The store provider boundary.
//!
//! This trait is the only surface through which the core reaches the
//! physical store; any conforming backend can stand behind it — a network
//! client against a real wide-column store, or the in-memory implementation
//! in [`crate::memory`] used for tests and local work.

use std::collections::HashMap;

use async_trait::async_trait;
use tablescope_model::{AttributeValue, Item, TableInfo};

use crate::expression::Condition;

/// Errors surfaced by a store provider.
///
/// Provider failures are not retried automatically; retry-worthiness
/// depends on the underlying cause, so they are surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The named table does not exist.
    #[error("table '{name}' not found")]
    TableNotFound {
        /// The requested table name.
        name: String,
    },
    /// The caller is not permitted to perform the operation.
    #[error("access denied: {message}")]
    AccessDenied {
        /// Detail from the store.
        message: String,
    },
    /// An item or key failed store-side validation.
    #[error("invalid item: {message}")]
    InvalidItem {
        /// Detail from the store.
        message: String,
    },
    /// A transport or I/O failure.
    #[error("store i/o error: {message}")]
    Io {
        /// Detail from the transport.
        message: String,
    },
}

/// Asynchronous access to the item store.
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// List the names of all tables.
    async fn list_tables(&self) -> Result<Vec<String>, ProviderError>;

    /// Fetch a table's key schema and a best-effort sample of its attribute
    /// names.
    async fn describe_table(&self, name: &str) -> Result<TableInfo, ProviderError>;

    /// Scan items from a table, optionally applying a filter condition and
    /// an item cap.
    async fn scan_items(
        &self,
        name: &str,
        filter: Option<&Condition>,
        max_items: Option<usize>,
    ) -> Result<Vec<Item>, ProviderError>;

    /// Write a single item, replacing any existing item with the same key.
    async fn put_item(&self, name: &str, item: Item) -> Result<(), ProviderError>;

    /// Write a batch of items with fire-and-continue semantics: individual
    /// failures are logged and do not stop the remaining writes.
    async fn put_items(&self, name: &str, items: Vec<Item>) -> Result<(), ProviderError>;

    /// Delete the item addressed by the given key attributes.
    async fn delete_item(
        &self,
        name: &str,
        key: HashMap<String, AttributeValue>,
    ) -> Result<(), ProviderError>;
}
