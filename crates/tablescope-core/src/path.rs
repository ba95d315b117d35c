//! Attribute paths into nested item values.
//!
//! A path addresses a value inside an item's tree of maps and lists, e.g.
//! `address.tags[2]`. Paths are parsed once into segments and then resolved
//! uniformly for get, set, and delete. Setting may create the final map key;
//! it never creates intermediate containers.

use std::fmt;

use tablescope_model::{AttributeValue, Item};

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named key into the item or a nested map.
    Key(String),
    /// An index into a nested list.
    Index(usize),
}

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPath {
    segments: Vec<PathSegment>,
}

/// Errors raised while parsing or resolving an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path text could not be parsed.
    #[error("malformed path at position {position}: {reason}")]
    Malformed {
        /// Byte offset of the problem.
        position: usize,
        /// What went wrong.
        reason: String,
    },
    /// A segment did not resolve to an existing value.
    #[error("path '{path}' does not resolve")]
    NotFound {
        /// The full path text.
        path: String,
    },
    /// A segment tried to traverse into a value that is not a map or list.
    #[error("'{path}' is not a map or list")]
    NotAContainer {
        /// The path up to and including the non-container value.
        path: String,
    },
    /// A list index was outside the list's bounds.
    #[error("index {index} is out of bounds at '{path}'")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The path up to the list.
        path: String,
    },
}

impl AttrPath {
    /// Parse path text like `address.tags[2]` into segments.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Malformed`] on empty segments, unclosed or
    /// non-numeric index brackets, or unexpected characters.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut chars = text.char_indices().peekable();
        let mut expect_key = true;

        while let Some(&(pos, ch)) = chars.peek() {
            match ch {
                '.' => {
                    if expect_key {
                        return Err(PathError::Malformed {
                            position: pos,
                            reason: "empty path segment".to_owned(),
                        });
                    }
                    chars.next();
                    expect_key = true;
                }
                '[' => {
                    if expect_key && segments.is_empty() {
                        return Err(PathError::Malformed {
                            position: pos,
                            reason: "path must start with an attribute name".to_owned(),
                        });
                    }
                    chars.next();
                    let mut digits = String::new();
                    while chars.peek().is_some_and(|&(_, c)| c.is_ascii_digit()) {
                        digits.push(chars.next().map_or('\0', |(_, c)| c));
                    }
                    if chars.next_if(|&(_, c)| c == ']').is_none() || digits.is_empty() {
                        return Err(PathError::Malformed {
                            position: pos,
                            reason: "expected '[index]'".to_owned(),
                        });
                    }
                    let index = digits.parse().map_err(|_| PathError::Malformed {
                        position: pos,
                        reason: format!("'{digits}' is not a valid index"),
                    })?;
                    segments.push(PathSegment::Index(index));
                    expect_key = false;
                }
                _ => {
                    if !expect_key {
                        return Err(PathError::Malformed {
                            position: pos,
                            reason: format!("unexpected character '{ch}'"),
                        });
                    }
                    let mut key = String::new();
                    while chars.peek().is_some_and(|&(_, c)| c != '.' && c != '[') {
                        key.push(chars.next().map_or('\0', |(_, c)| c));
                    }
                    if key.is_empty() {
                        return Err(PathError::Malformed {
                            position: pos,
                            reason: "empty path segment".to_owned(),
                        });
                    }
                    segments.push(PathSegment::Key(key));
                    expect_key = false;
                }
            }
        }

        if segments.is_empty() || expect_key {
            return Err(PathError::Malformed {
                position: text.len(),
                reason: "empty path".to_owned(),
            });
        }

        Ok(Self { segments })
    }

    /// The parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Follow the path through the item, returning the addressed value.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if any segment does not resolve.
    pub fn follow<'a>(&self, item: &'a Item) -> Result<&'a AttributeValue, PathError> {
        let (first, rest) = self.split_first();
        let mut current = match first {
            PathSegment::Key(key) => item.get(key).ok_or_else(|| self.not_found())?,
            PathSegment::Index(_) => return Err(self.not_found()),
        };

        for (i, segment) in rest.iter().enumerate() {
            current = self.step(current, segment, i + 1)?;
        }
        Ok(current)
    }

    /// Assign `value` at the path, overwriting any existing value.
    ///
    /// All segments but the last must resolve to existing containers. The
    /// final segment may name a map key that does not exist yet (the key is
    /// created); a final list index must be in bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if an intermediate segment does not resolve, a
    /// non-container is traversed, or a final list index is out of bounds.
    pub fn set_at(&self, item: &mut Item, value: AttributeValue) -> Result<(), PathError> {
        let (first, rest) = self.split_first();

        let Some((last, middle)) = rest.split_last() else {
            // Single-segment path: a top-level attribute.
            match first {
                PathSegment::Key(key) => {
                    item.insert(key.clone(), value);
                    return Ok(());
                }
                PathSegment::Index(_) => return Err(self.not_found()),
            }
        };

        let mut current = match first {
            PathSegment::Key(key) => item.get_mut(key).ok_or_else(|| self.not_found())?,
            PathSegment::Index(_) => return Err(self.not_found()),
        };
        for (i, segment) in middle.iter().enumerate() {
            current = self.step_mut(current, segment, i + 1)?;
        }

        match (last, current) {
            (PathSegment::Key(key), AttributeValue::M(map)) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (PathSegment::Index(index), AttributeValue::L(list)) => {
                if *index >= list.len() {
                    return Err(PathError::IndexOutOfBounds {
                        index: *index,
                        path: self.prefix_text(self.segments.len() - 1),
                    });
                }
                list[*index] = value;
                Ok(())
            }
            _ => Err(PathError::NotAContainer {
                path: self.prefix_text(self.segments.len() - 1),
            }),
        }
    }

    /// Remove the value at the path, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the path does not fully resolve.
    pub fn delete_at(&self, item: &mut Item) -> Result<AttributeValue, PathError> {
        let (first, rest) = self.split_first();

        let Some((last, middle)) = rest.split_last() else {
            match first {
                PathSegment::Key(key) => return item.remove(key).ok_or_else(|| self.not_found()),
                PathSegment::Index(_) => return Err(self.not_found()),
            }
        };

        let mut current = match first {
            PathSegment::Key(key) => item.get_mut(key).ok_or_else(|| self.not_found())?,
            PathSegment::Index(_) => return Err(self.not_found()),
        };
        for (i, segment) in middle.iter().enumerate() {
            current = self.step_mut(current, segment, i + 1)?;
        }

        match (last, current) {
            (PathSegment::Key(key), AttributeValue::M(map)) => {
                map.remove(key).ok_or_else(|| self.not_found())
            }
            (PathSegment::Index(index), AttributeValue::L(list)) => {
                if *index >= list.len() {
                    return Err(PathError::IndexOutOfBounds {
                        index: *index,
                        path: self.prefix_text(self.segments.len() - 1),
                    });
                }
                Ok(list.remove(*index))
            }
            _ => Err(PathError::NotAContainer {
                path: self.prefix_text(self.segments.len() - 1),
            }),
        }
    }

    fn split_first(&self) -> (&PathSegment, &[PathSegment]) {
        // Parsing guarantees at least one segment.
        (&self.segments[0], &self.segments[1..])
    }

    fn step<'a>(
        &self,
        current: &'a AttributeValue,
        segment: &PathSegment,
        depth: usize,
    ) -> Result<&'a AttributeValue, PathError> {
        match (segment, current) {
            (PathSegment::Key(key), AttributeValue::M(map)) => {
                map.get(key).ok_or_else(|| self.not_found())
            }
            (PathSegment::Index(index), AttributeValue::L(list)) => {
                list.get(*index).ok_or_else(|| PathError::IndexOutOfBounds {
                    index: *index,
                    path: self.prefix_text(depth),
                })
            }
            _ => Err(PathError::NotAContainer {
                path: self.prefix_text(depth),
            }),
        }
    }

    fn step_mut<'a>(
        &self,
        current: &'a mut AttributeValue,
        segment: &PathSegment,
        depth: usize,
    ) -> Result<&'a mut AttributeValue, PathError> {
        match (segment, current) {
            (PathSegment::Key(key), AttributeValue::M(map)) => {
                map.get_mut(key).ok_or_else(|| self.not_found())
            }
            (PathSegment::Index(index), AttributeValue::L(list)) => {
                let len = list.len();
                list.get_mut(*index)
                    .ok_or_else(|| PathError::IndexOutOfBounds {
                        index: *index,
                        path: format!("{} (len {len})", self.prefix_text(depth)),
                    })
            }
            _ => Err(PathError::NotAContainer {
                path: self.prefix_text(depth),
            }),
        }
    }

    fn not_found(&self) -> PathError {
        PathError::NotFound {
            path: self.to_string(),
        }
    }

    /// The textual form of the first `depth` segments.
    fn prefix_text(&self, depth: usize) -> String {
        let mut s = String::new();
        for segment in &self.segments[..depth] {
            match segment {
                PathSegment::Key(key) => {
                    if !s.is_empty() {
                        s.push('.');
                    }
                    s.push_str(key);
                }
                PathSegment::Index(index) => {
                    s.push('[');
                    s.push_str(&index.to_string());
                    s.push(']');
                }
            }
        }
        s
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix_text(self.segments.len()))
    }
}
