//! Events produced by the core for the surrounding interactive layer.
//!
//! The UI consumes these as discrete messages: result-set snapshots, status
//! and error lines, and prompt requests raised by multi-step commands. The
//! core never renders anything itself.

use tablescope_model::{AttributeValue, Item, TableInfo};

use crate::resultset::ResultSet;

/// A discrete message from the core to its owner.
#[derive(Debug)]
pub enum Event {
    /// A read operation completed and produced a fresh result set.
    ResultSetLoaded(ResultSet),
    /// A status line for the operator.
    Status(String),
    /// An error to surface to the operator.
    Error(String),
    /// A multi-step command needs a line of input.
    PromptForInput {
        /// The prompt to display.
        prompt: String,
    },
    /// An in-flight operation was cancelled; any partial results were
    /// discarded.
    Cancelled,
}

/// Pluralizing helper for user-visible counts: `apply_to_n("put ", 2,
/// "item", "items", "? ")` yields `"put 2 items? "`.
#[must_use]
pub fn apply_to_n(prefix: &str, n: usize, singular: &str, plural: &str, suffix: &str) -> String {
    if n == 1 {
        format!("{prefix}{n} {singular}{suffix}")
    } else {
        format!("{prefix}{n} {plural}{suffix}")
    }
}

/// The prompt sequence behind the "create item" command: one prompt per key
/// attribute (partition key, then sort key when the table has one), after
/// which the collected answers assemble the new item.
#[derive(Debug)]
pub struct KeyPromptSequence {
    prompts: Vec<String>,
    answers: Vec<String>,
}

impl KeyPromptSequence {
    /// Build the prompt sequence for a table's key schema.
    #[must_use]
    pub fn for_table(info: &TableInfo) -> Self {
        let mut prompts = vec![format!("{}: ", info.keys.partition_key)];
        if let Some(sort_key) = &info.keys.sort_key {
            prompts.push(format!("{sort_key}: "));
        }
        Self {
            prompts,
            answers: Vec::new(),
        }
    }

    /// The next prompt to raise, or `None` once every key has an answer.
    #[must_use]
    pub fn next_prompt(&self) -> Option<Event> {
        self.prompts
            .get(self.answers.len())
            .map(|prompt| Event::PromptForInput {
                prompt: prompt.clone(),
            })
    }

    /// Record the answer to the current prompt.
    pub fn answer(&mut self, value: String) {
        if self.answers.len() < self.prompts.len() {
            self.answers.push(value);
        }
    }

    /// Returns `true` once every prompt has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.prompts.len()
    }

    /// Assemble the new item from the collected answers. Key attributes are
    /// string-typed; further attributes are added through normal edits.
    #[must_use]
    pub fn build_item(&self, info: &TableInfo) -> Item {
        let mut item = Item::new();
        if let Some(value) = self.answers.first() {
            item.insert(
                info.keys.partition_key.clone(),
                AttributeValue::S(value.clone()),
            );
        }
        if let (Some(sort_key), Some(value)) = (&info.keys.sort_key, self.answers.get(1)) {
            item.insert(sort_key.clone(), AttributeValue::S(value.clone()));
        }
        item
    }
}
