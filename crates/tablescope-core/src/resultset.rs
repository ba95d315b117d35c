//! The editable result set and its mutation engine.
//!
//! A result set materializes the items returned by a scan or query as an
//! ordered, independently-trackable collection. Each item carries
//! dirty/marked/new state; edits are addressed by attribute path and routed
//! through the selection resolver so every mutating command uniformly
//! supports both single-item and marked-bulk editing.

use std::collections::BTreeSet;
use std::sync::Arc;

use tablescope_model::table::ordered_column_names;
use tablescope_model::{AttributeValue, Item, TableInfo};

use crate::expression::Expr;
use crate::path::{AttrPath, PathError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by result-set edit operations.
///
/// All variants are detected before the addressed item is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The attribute path failed to parse or resolve.
    #[error(transparent)]
    Path(#[from] PathError),
    /// An inferred-type assignment addressed an attribute with no current
    /// value (or one whose type cannot take a textual assignment).
    #[error("attribute type for '{path}' must be set")]
    TypeRequired {
        /// The addressed path.
        path: String,
    },
    /// A number assignment did not carry valid number text.
    #[error("'{input}' is not a valid number")]
    InvalidNumber {
        /// The rejected input.
        input: String,
    },
    /// A boolean assignment did not carry `true` or `false`.
    #[error("'{input}' is not a valid boolean")]
    InvalidBool {
        /// The rejected input.
        input: String,
    },
    /// An item index was outside the result set.
    #[error("item index {index} is out of range")]
    OutOfRange {
        /// The rejected index.
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// Item state
// ---------------------------------------------------------------------------

/// Per-item tracking state within a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemState {
    /// The item has in-memory edits not yet committed to the store.
    pub dirty: bool,
    /// The item is selected for bulk operations.
    pub marked: bool,
    /// The item has no prior committed state in the store.
    pub new: bool,
}

impl ItemState {
    /// State for a freshly created, not-yet-committed item.
    #[must_use]
    pub fn new_item() -> Self {
        Self {
            dirty: true,
            marked: false,
            new: true,
        }
    }
}

/// An item paired with its position in the owning result set, used to
/// address bulk operations without re-deriving indices.
#[derive(Debug, Clone)]
pub struct ItemIndex {
    /// Position within the result set.
    pub index: usize,
    /// A clone of the item at that position.
    pub item: Item,
}

// ---------------------------------------------------------------------------
// Typed assignment
// ---------------------------------------------------------------------------

/// The value half of an attribute assignment.
///
/// `Inferred` carries raw text and takes its target type from the
/// attribute's current value: a string stays a string, a number stays a
/// number, a boolean stays a boolean. Assigning to an attribute that does
/// not exist yet requires one of the explicit variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewValue {
    /// Infer the target type from the attribute's current value.
    Inferred(String),
    /// Assign a string value.
    Str(String),
    /// Assign a number value (text is validated).
    Num(String),
    /// Assign a boolean value.
    Bool(bool),
    /// Assign a null value.
    Null,
}

/// Validate number text: optional sign, digits, optional fraction, optional
/// exponent. The text itself is stored, never a parsed float.
fn validate_number(input: &str) -> Result<(), EditError> {
    let invalid = || EditError::InvalidNumber {
        input: input.to_owned(),
    };

    let rest = input.strip_prefix(['+', '-']).unwrap_or(input);
    let (mantissa, exponent) = match rest.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (rest, None),
    };

    let mut has_digit = false;
    let mut has_dot = false;
    for ch in mantissa.chars() {
        match ch {
            '.' if !has_dot => has_dot = true,
            c if c.is_ascii_digit() => has_digit = true,
            _ => return Err(invalid()),
        }
    }
    if !has_digit {
        return Err(invalid());
    }

    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !exp_digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Result set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    item: Item,
    state: ItemState,
}

/// The materialized, editable result of a scan, query, or filter.
///
/// Created fresh by every read operation and replaced wholesale when a new
/// one executes; mutated in place only by attribute edits, marking, and
/// post-commit state clears.
#[derive(Debug, Clone)]
pub struct ResultSet {
    table_info: Arc<TableInfo>,
    query: Option<Expr>,
    rows: Vec<Row>,
    columns: Vec<String>,
}

impl ResultSet {
    /// Build a result set from freshly fetched items, all in default state.
    #[must_use]
    pub fn new(table_info: Arc<TableInfo>, query: Option<Expr>, items: Vec<Item>) -> Self {
        let rows = items
            .into_iter()
            .map(|item| Row {
                item,
                state: ItemState::default(),
            })
            .collect();
        let mut rs = Self {
            table_info,
            query,
            rows,
            columns: Vec::new(),
        };
        rs.refresh_columns();
        rs
    }

    /// Build a result set from items that carry existing state, preserving
    /// that state. Used by client-side filtering.
    #[must_use]
    pub fn with_states(
        table_info: Arc<TableInfo>,
        query: Option<Expr>,
        entries: Vec<(Item, ItemState)>,
    ) -> Self {
        let rows = entries
            .into_iter()
            .map(|(item, state)| Row { item, state })
            .collect();
        let mut rs = Self {
            table_info,
            query,
            rows,
            columns: Vec::new(),
        };
        rs.refresh_columns();
        rs
    }

    /// The table this result set was read from.
    #[must_use]
    pub fn table_info(&self) -> &Arc<TableInfo> {
        &self.table_info
    }

    /// The expression that produced this result set, if any.
    #[must_use]
    pub fn query(&self) -> Option<&Expr> {
        self.query.as_ref()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the result set holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The item at `index`, if in range.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.rows.get(index).map(|row| &row.item)
    }

    /// Iterate over the items in order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.rows.iter().map(|row| &row.item)
    }

    /// Iterate over `(item, state)` pairs in order.
    pub fn entries(&self) -> impl Iterator<Item = (&Item, ItemState)> {
        self.rows.iter().map(|row| (&row.item, row.state))
    }

    /// The derived column names: partition key, sort key, then the union of
    /// the remaining attribute names across all items, alphabetically.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Recompute the column set from the current items.
    pub fn refresh_columns(&mut self) {
        let names: BTreeSet<String> = self
            .rows
            .iter()
            .flat_map(|row| row.item.keys().cloned())
            .collect();
        self.columns = ordered_column_names(&self.table_info.keys, names);
    }

    // -- state accessors ----------------------------------------------------

    /// Returns the dirty flag of the item at `index`.
    #[must_use]
    pub fn is_dirty(&self, index: usize) -> bool {
        self.rows.get(index).is_some_and(|row| row.state.dirty)
    }

    /// Returns the marked flag of the item at `index`.
    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        self.rows.get(index).is_some_and(|row| row.state.marked)
    }

    /// Returns the new flag of the item at `index`.
    #[must_use]
    pub fn is_new(&self, index: usize) -> bool {
        self.rows.get(index).is_some_and(|row| row.state.new)
    }

    /// Set or clear the marked flag; no other state is affected.
    pub fn set_mark(&mut self, index: usize, marked: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.state.marked = marked;
        }
    }

    /// Set or clear the dirty flag directly.
    pub fn set_dirty(&mut self, index: usize, dirty: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.state.dirty = dirty;
        }
    }

    /// Clear dirty and new after a successful commit of the item.
    pub fn mark_committed(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.state.dirty = false;
            row.state.new = false;
        }
    }

    /// The marked items paired with their indices, in result-set order.
    #[must_use]
    pub fn marked_items(&self) -> Vec<ItemIndex> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.state.marked)
            .map(|(index, row)| ItemIndex {
                index,
                item: row.item.clone(),
            })
            .collect()
    }

    // -- mutation engine ----------------------------------------------------

    /// Append a freshly created item (typically with [`ItemState::new_item`]
    /// state). The caller supplies all key attributes; key presence is
    /// validated by the write service before commit.
    pub fn add_new_item(&mut self, item: Item, state: ItemState) {
        self.rows.push(Row { item, state });
        self.refresh_columns();
    }

    /// The indices a mutating command applies to: every marked item when any
    /// are marked, otherwise just the addressed item.
    #[must_use]
    pub fn selection(&self, index: usize) -> Vec<usize> {
        let marked: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.state.marked)
            .map(|(i, _)| i)
            .collect();
        if marked.is_empty() {
            vec![index]
        } else {
            marked
        }
    }

    /// Apply `f` to the selection resolved from `index`: every marked item
    /// when any are marked, otherwise the single addressed item. The first
    /// error aborts; items later in the selection are left untouched. An
    /// out-of-range addressed index with nothing marked is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn apply_to_selection<E, F>(&mut self, index: usize, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &mut Item) -> Result<(), E>,
    {
        for i in self.selection(index) {
            if let Some(row) = self.rows.get_mut(i) {
                f(i, &mut row.item)?;
            }
        }
        Ok(())
    }

    /// Assign a value at `path` on the selection resolved from `index`.
    ///
    /// The target type is resolved once against the addressed item (see
    /// [`NewValue`]); the same typed value is then applied to every selected
    /// item. Each successfully edited item becomes dirty; columns are
    /// recomputed afterwards. The first failing edit aborts the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] on an invalid index, an unresolvable path, a
    /// type-inference failure, or invalid number/boolean text.
    pub fn set_attribute(
        &mut self,
        index: usize,
        path: &AttrPath,
        value: NewValue,
    ) -> Result<(), EditError> {
        let value = self.resolve_new_value(index, path, value)?;

        let mut outcome = Ok(());
        for i in self.selection(index) {
            let Some(row) = self.rows.get_mut(i) else {
                outcome = Err(EditError::OutOfRange { index: i });
                break;
            };
            if let Err(err) = path.set_at(&mut row.item, value.clone()) {
                outcome = Err(err.into());
                break;
            }
            row.state.dirty = true;
        }
        // Items ahead of a failure were already edited, so the column set
        // must reflect them either way.
        self.refresh_columns();
        outcome
    }

    /// Remove the value at `path` on the addressed item.
    ///
    /// The path is validated against the item before anything is removed;
    /// on success the item becomes dirty and columns are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] on an invalid index or a path that does not
    /// resolve.
    pub fn delete_attribute(&mut self, index: usize, path: &AttrPath) -> Result<(), EditError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(EditError::OutOfRange { index })?;
        path.follow(&row.item)?;
        path.delete_at(&mut row.item)?;
        row.state.dirty = true;
        self.refresh_columns();
        Ok(())
    }

    /// Resolve a [`NewValue`] into a concrete attribute value, consulting
    /// the addressed item when the target type must be inferred.
    fn resolve_new_value(
        &self,
        index: usize,
        path: &AttrPath,
        value: NewValue,
    ) -> Result<AttributeValue, EditError> {
        match value {
            NewValue::Str(s) => Ok(AttributeValue::S(s)),
            NewValue::Num(n) => {
                validate_number(&n)?;
                Ok(AttributeValue::N(n))
            }
            NewValue::Bool(b) => Ok(AttributeValue::Bool(b)),
            NewValue::Null => Ok(AttributeValue::Null(true)),
            NewValue::Inferred(text) => {
                let row = self.rows.get(index).ok_or(EditError::OutOfRange { index })?;
                let current = path.follow(&row.item).map_err(|_| EditError::TypeRequired {
                    path: path.to_string(),
                })?;
                match current {
                    AttributeValue::S(_) => Ok(AttributeValue::S(text)),
                    AttributeValue::N(_) => {
                        validate_number(&text)?;
                        Ok(AttributeValue::N(text))
                    }
                    AttributeValue::Bool(_) => match text.parse::<bool>() {
                        Ok(b) => Ok(AttributeValue::Bool(b)),
                        Err(_) => Err(EditError::InvalidBool { input: text }),
                    },
                    _ => Err(EditError::TypeRequired {
                        path: path.to_string(),
                    }),
                }
            }
        }
    }
}
