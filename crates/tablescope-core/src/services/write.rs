//! The table write service: committing edits back to the store.

use std::sync::Arc;

use tracing::{debug, warn};

use tablescope_model::{Item, TableInfo};

use crate::provider::{ProviderError, TableProvider};
use crate::resultset::ResultSet;

/// Errors produced by write operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// Commit was requested for an item with no uncommitted edits.
    #[error("item at index {index} is not dirty")]
    NotDirty {
        /// The addressed index.
        index: usize,
    },
    /// Touch was requested for an item that has uncommitted edits.
    #[error("cannot touch dirty item at index {index}")]
    AlreadyDirty {
        /// The addressed index.
        index: usize,
    },
    /// The item is missing a key attribute required by the table schema.
    #[error("item is missing required key attribute '{attr}'")]
    MissingKeyAttribute {
        /// The missing attribute name.
        attr: String,
    },
    /// An item index was outside the result set.
    #[error("item index {index} is out of range")]
    OutOfRange {
        /// The rejected index.
        index: usize,
    },
    /// The store provider reported a failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// The outcome of a bulk commit: which indices landed and which failed.
///
/// Commits are best-effort per item — one failure never blocks the rest —
/// so the caller can report succeeded/failed counts accurately.
#[derive(Debug, Default)]
pub struct BulkWriteOutcome {
    /// Indices whose items were written and marked clean.
    pub succeeded: Vec<usize>,
    /// Indices that failed, with the error for each.
    pub failed: Vec<(usize, WriteError)>,
}

/// Commits dirty/marked items back through a store provider, enforcing the
/// dirty/clean preconditions.
#[derive(Debug)]
pub struct TableWriteService<P> {
    provider: Arc<P>,
}

impl<P: TableProvider> TableWriteService<P> {
    /// Creates a write service over the given provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Commit the dirty item at `index` to the store. On success the item's
    /// dirty and new flags are cleared; on failure all state is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::NotDirty`] when the item has no uncommitted
    /// edits, [`WriteError::MissingKeyAttribute`] when a required key
    /// attribute is absent, or the provider's error.
    pub async fn commit(&self, result_set: &mut ResultSet, index: usize) -> Result<(), WriteError> {
        if !result_set.is_dirty(index) {
            return Err(WriteError::NotDirty { index });
        }
        self.put_unconditionally(result_set, index).await?;
        result_set.mark_committed(index);
        Ok(())
    }

    /// Commit each of `indices` independently, best-effort: a failure on one
    /// item is recorded and the rest are still attempted.
    pub async fn commit_selection(
        &self,
        result_set: &mut ResultSet,
        indices: &[usize],
    ) -> BulkWriteOutcome {
        let mut outcome = BulkWriteOutcome::default();
        for &index in indices {
            match self.commit(result_set, index).await {
                Ok(()) => outcome.succeeded.push(index),
                Err(err) => {
                    warn!(index, error = %err, "commit failed; continuing with remaining items");
                    outcome.failed.push((index, err));
                }
            }
        }
        debug!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk commit finished"
        );
        outcome
    }

    /// Re-commit the clean item at `index` unchanged, refreshing any
    /// store-side write metadata. Touching is defined as a no-edit
    /// operation, so a dirty item is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::AlreadyDirty`] when the item has uncommitted
    /// edits, or the provider's error.
    pub async fn touch(&self, result_set: &mut ResultSet, index: usize) -> Result<(), WriteError> {
        if result_set.is_dirty(index) {
            return Err(WriteError::AlreadyDirty { index });
        }
        self.put_unconditionally(result_set, index).await
    }

    /// Delete the given items from the store, independent of their dirty
    /// state. The in-memory result set is not modified; the caller is
    /// expected to re-scan or re-query for a consistent view.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; deletion stops at the first failure.
    pub async fn delete(&self, info: &TableInfo, items: &[Item]) -> Result<(), WriteError> {
        for item in items {
            self.provider
                .delete_item(&info.name, item.key_value(info))
                .await?;
        }
        debug!(table = %info.name, count = items.len(), "deleted items");
        Ok(())
    }

    /// Validate key presence and put the item at `index` without touching
    /// any result-set state.
    async fn put_unconditionally(
        &self,
        result_set: &ResultSet,
        index: usize,
    ) -> Result<(), WriteError> {
        let info = result_set.table_info().clone();
        let item = result_set
            .item(index)
            .ok_or(WriteError::OutOfRange { index })?;
        validate_key_attributes(&info, item)?;
        self.provider
            .put_item(&info.name, item.clone())
            .await
            .map_err(WriteError::from)
    }
}

/// Check that every key attribute required by the schema is present. A
/// missing key is a caller contract violation caught before the store is
/// touched.
fn validate_key_attributes(info: &TableInfo, item: &Item) -> Result<(), WriteError> {
    if !item.contains_key(&info.keys.partition_key) {
        return Err(WriteError::MissingKeyAttribute {
            attr: info.keys.partition_key.clone(),
        });
    }
    if let Some(sort_key) = &info.keys.sort_key {
        if !item.contains_key(sort_key) {
            return Err(WriteError::MissingKeyAttribute {
                attr: sort_key.clone(),
            });
        }
    }
    Ok(())
}
