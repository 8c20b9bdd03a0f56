//! Selecting files by the tags in their `meta` records.
//!
//! The expected shape of parsed content is a list of mapping records, some
//! of which carry a `meta` mapping with a `tags` list:
//!
//! ```yaml
//! - meta:
//!     tags: [smoke, nightly]
//! - step: run
//! ```
//!
//! Anything else (a scalar, a mapping at the top level, records without
//! `meta`, `meta` without `tags`) contributes no tags and is never an error.

use std::collections::BTreeSet;

use serde_yaml::Value;

use crate::traits::Predicate;

/// Which tags a file must carry to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagSelection {
    /// Filtering disabled: every file is kept.
    #[default]
    Unfiltered,

    /// Keep files carrying at least one of these tags.
    TagSet(BTreeSet<String>),
}

/// Options record handed to [`TagFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    pub tags: TagSelection,
}

impl TagOptions {
    /// Options that keep every file.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Options that keep files tagged with any of `tags`.
    ///
    /// An empty iterator produces an empty set, which matches nothing.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: TagSelection::TagSet(tags.into_iter().map(Into::into).collect()),
        }
    }
}

/// Every tag string found under `records[*].meta.tags`, in document order.
///
/// Non-string tags are skipped.
pub fn tags_of(parsed: &Value) -> impl Iterator<Item = &str> {
    parsed
        .as_sequence()
        .into_iter()
        .flatten()
        .filter_map(|record| record.get("meta"))
        .filter_map(|meta| meta.get("tags"))
        .filter_map(Value::as_sequence)
        .flatten()
        .filter_map(Value::as_str)
}

/// Whether `parsed` satisfies the tag selection in `options`.
///
/// `None` (a file read without a parser) carries no tags.
pub fn accepts(parsed: Option<&Value>, options: &TagOptions) -> bool {
    let wanted = match &options.tags {
        TagSelection::Unfiltered => return true,
        TagSelection::TagSet(wanted) => wanted,
    };
    parsed.is_some_and(|value| tags_of(value).any(|tag| wanted.contains(tag)))
}

/// [`Predicate`] form of [`accepts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TagFilter;

impl Predicate<Value, TagOptions> for TagFilter {
    fn accepts(&self, parsed: Option<&Value>, options: &TagOptions) -> bool {
        accepts(parsed, options)
    }
}
