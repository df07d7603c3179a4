//! Filter operators and the micro-syntax operator table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Comparison applied by a single [`ValueFilter`](crate::ValueFilter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Type-dependent default (substring for strings, range for dates, equality otherwise).
    Default,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Exact, case-sensitive equality.
    EqualCaseSensitive,
    /// Case-insensitive equality.
    EqualCaseInsensitive,
    /// Inequality.
    NotEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessThanOrEqual,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterThanOrEqual,
    /// The property is null.
    IsNull,
    /// The property is not null.
    NotNull,
}

impl FilterOperator {
    /// All operators in declaration order.
    pub const ALL: [FilterOperator; 13] = [
        Self::Default,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::EqualCaseSensitive,
        Self::EqualCaseInsensitive,
        Self::NotEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::IsNull,
        Self::NotNull,
    ];

    /// Operators that never carry a value.
    #[inline]
    pub fn is_nullary(self) -> bool {
        matches!(self, Self::IsNull | Self::NotNull)
    }

    /// Ordering comparisons.
    #[inline]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    /// Substring family (`Contains`, `StartsWith`, `EndsWith`).
    #[inline]
    pub fn is_text_match(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }

    /// Get the operator name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Contains => "Contains",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::EqualCaseSensitive => "EqualCaseSensitive",
            Self::EqualCaseInsensitive => "EqualCaseInsensitive",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::IsNull => "IsNull",
            Self::NotNull => "NotNull",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal prefixes recognised by the micro-syntax parser.
///
/// Entries are kept sorted longest literal first so `==` wins over `=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, FilterOperator>",
    into = "BTreeMap<String, FilterOperator>"
)]
pub struct OperatorTable {
    entries: Vec<(String, FilterOperator)>,
}

impl OperatorTable {
    /// Build a table from `(literal, operator)` pairs.
    ///
    /// Empty literals are dropped; `Default` needs no literal.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, FilterOperator)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, FilterOperator)> = pairs
            .into_iter()
            .map(|(literal, op)| (literal.into(), op))
            .filter(|(literal, _)| !literal.is_empty())
            .collect();
        // Stable: equal lengths keep insertion order.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// Iterate entries, longest literal first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FilterOperator)> {
        self.entries.iter().map(|(literal, op)| (literal.as_str(), *op))
    }

    /// Find the operator at the start of `segment`.
    ///
    /// Returns the operator and the remaining text. Nullary literals only
    /// match the whole (trimmed) segment, ignoring ASCII case.
    pub fn match_prefix<'a>(&self, segment: &'a str) -> Option<(FilterOperator, &'a str)> {
        for (literal, op) in self.iter() {
            if op.is_nullary() {
                if segment.trim_end().eq_ignore_ascii_case(literal) {
                    return Some((op, ""));
                }
            } else if let Some(rest) = segment.strip_prefix(literal) {
                return Some((op, rest));
            }
        }
        None
    }

    /// The literal used to render `op`, if the table has one.
    ///
    /// When several literals map to the same operator the longest wins.
    pub fn literal_for(&self, op: FilterOperator) -> Option<&str> {
        self.iter()
            .find(|(_, candidate)| *candidate == op)
            .map(|(literal, _)| literal)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::from_pairs([
            ("NOTNULL", FilterOperator::NotNull),
            ("ISNULL", FilterOperator::IsNull),
            ("==", FilterOperator::EqualCaseSensitive),
            (">=", FilterOperator::GreaterThanOrEqual),
            ("<=", FilterOperator::LessThanOrEqual),
            (">", FilterOperator::GreaterThan),
            ("<", FilterOperator::LessThan),
            ("=", FilterOperator::EqualCaseInsensitive),
            ("!", FilterOperator::NotEqual),
            ("~", FilterOperator::Contains),
            ("^", FilterOperator::StartsWith),
            ("$", FilterOperator::EndsWith),
        ])
    }
}

impl From<BTreeMap<String, FilterOperator>> for OperatorTable {
    fn from(map: BTreeMap<String, FilterOperator>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<OperatorTable> for BTreeMap<String, FilterOperator> {
    fn from(table: OperatorTable) -> Self {
        table.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_literal_first() {
        let table = OperatorTable::default();
        let literals: Vec<_> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(&literals[..2], &["NOTNULL", "ISNULL"]);
        assert_eq!(table.match_prefix("==abc"), Some((FilterOperator::EqualCaseSensitive, "abc")));
        assert_eq!(table.match_prefix("=abc"), Some((FilterOperator::EqualCaseInsensitive, "abc")));
        assert_eq!(table.match_prefix(">=5"), Some((FilterOperator::GreaterThanOrEqual, "5")));
    }

    #[test]
    fn test_nullary_needs_whole_segment() {
        let table = OperatorTable::default();
        assert_eq!(table.match_prefix("isnull"), Some((FilterOperator::IsNull, "")));
        assert_eq!(table.match_prefix("NOTNULL "), Some((FilterOperator::NotNull, "")));
        assert_eq!(table.match_prefix("ISNULLABLE"), None);
    }

    #[test]
    fn test_literal_for() {
        let table = OperatorTable::default();
        assert_eq!(table.literal_for(FilterOperator::Contains), Some("~"));
        assert_eq!(table.literal_for(FilterOperator::Default), None);
    }

    #[test]
    fn test_custom_table() {
        let table = OperatorTable::from_pairs([("like:", FilterOperator::Contains), ("", FilterOperator::Default)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.match_prefix("like:abc"), Some((FilterOperator::Contains, "abc")));
    }
}
