//! Condition evaluation against in-memory items.
//!
//! Used for client-side filtering of an already-fetched result set, for
//! re-filtering scan results, and by scan backends that apply a condition
//! while iterating rows.

use tablescope_model::{AttributeValue, Item};

use super::compiler::{Condition, ConditionTest};

impl Condition {
    /// Test this condition against an item.
    ///
    /// A missing attribute never matches. `^=` matches only string
    /// attributes; a non-string attribute simply does not match (the
    /// compiler has already guaranteed the prefix itself is a string).
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        let Some(attr) = item.get(&self.name) else {
            return false;
        };
        match &self.test {
            ConditionTest::Equals(expected) => values_equal(attr, expected),
            ConditionTest::BeginsWith(prefix) => {
                attr.as_s().is_some_and(|s| s.starts_with(prefix.as_str()))
            }
        }
    }
}

/// Per-variant equality, numeric-aware for `N` values.
///
/// Numbers are carried as text, so `"1.0"` and `"1"` denote the same value;
/// when both sides parse they compare numerically, otherwise the exact text
/// is compared. Cross-variant comparison is never equal.
fn values_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::N(na), AttributeValue::N(nb)) => {
            match (na.parse::<f64>(), nb.parse::<f64>()) {
                (Ok(fa), Ok(fb)) => (fa - fb).abs() < f64::EPSILON,
                _ => na == nb,
            }
        }
        _ => a == b,
    }
}
