//! Micro-syntax parser and renderer.
//!
//! A filter string is a list of segments separated by unescaped `,`, `|` or
//! `;`. Each segment may start with an operator literal from the active
//! [`OperatorTable`]; without one the segment uses [`FilterOperator::Default`].
//!
//! ```rust
//! use sieve_query::syntax;
//! use sieve_query::{FilterOperator, OperatorTable};
//!
//! let filters = syntax::parse(">2020-01-01,ISNULL", &OperatorTable::default());
//! assert_eq!(filters[0].operator(), FilterOperator::GreaterThan);
//! assert_eq!(filters[0].value(), Some("2020-01-01"));
//! assert_eq!(filters[1].operator(), FilterOperator::IsNull);
//!
//! let rendered = syntax::render(&filters, &OperatorTable::default());
//! assert_eq!(rendered, ">2020-01-01,ISNULL");
//! ```

use smallvec::SmallVec;

use crate::operator::{FilterOperator, OperatorTable};
use crate::value_filter::ValueFilter;

/// Characters separating values.
pub const SEPARATORS: [char; 3] = [',', '|', ';'];

/// Escape character.
pub const ESCAPE: char = '\\';

/// Segments of a typical filter string fit inline.
pub type Segments<'a> = SmallVec<[&'a str; 4]>;

/// Parse a filter string into value filters.
///
/// Never fails: an unknown prefix means `Default`, and an empty string is a
/// single `Default` filter for the empty value.
pub fn parse(text: &str, table: &OperatorTable) -> Vec<ValueFilter> {
    split(text)
        .into_iter()
        .map(|segment| parse_segment(segment, table))
        .collect()
}

/// Parse a single (still escaped) segment.
pub fn parse_segment(segment: &str, table: &OperatorTable) -> ValueFilter {
    let trimmed = segment.trim_start();
    match table.match_prefix(trimmed) {
        Some((op, _)) if op.is_nullary() => ValueFilter::nullary(op),
        Some((op, rest)) => ValueFilter::new(op, unescape(rest)),
        None => ValueFilter::new(FilterOperator::Default, unescape(trimmed)),
    }
}

/// Split on unescaped separators, keeping escapes in place.
pub fn split(text: &str) -> Segments<'_> {
    let mut segments = Segments::new();
    let mut start = 0;
    let mut chars = text.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == ESCAPE {
            // Skip whatever follows; unescape decides what it means.
            chars.next();
        } else if SEPARATORS.contains(&c) {
            segments.push(&text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    segments.push(&text[start..]);
    segments
}

/// Remove escapes from a segment.
///
/// A backslash only escapes a separator or another backslash; anywhere else
/// it is kept literally.
pub fn unescape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.peek() {
                Some(&next) if next == ESCAPE || SEPARATORS.contains(&next) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape separators and backslashes in a raw value.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c == ESCAPE || SEPARATORS.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Render one value filter as a segment.
pub fn render_one(filter: &ValueFilter, table: &OperatorTable) -> String {
    let op = filter.operator();
    let prefix = match op {
        FilterOperator::Default => "",
        _ => table.literal_for(op).unwrap_or(""),
    };
    match filter.value() {
        Some(value) if !op.is_nullary() => format!("{}{}", prefix, escape(value)),
        _ => prefix.to_string(),
    }
}

/// Render value filters as a comma-joined filter string.
pub fn render(filters: &[ValueFilter], table: &OperatorTable) -> String {
    filters
        .iter()
        .map(|f| render_one(f, table))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_default(text: &str) -> Vec<ValueFilter> {
        parse(text, &OperatorTable::default())
    }

    #[test]
    fn test_empty_is_single_empty_value() {
        assert_eq!(parse_default(""), vec![ValueFilter::new(FilterOperator::Default, "")]);
        assert_eq!(parse_default("~"), vec![ValueFilter::new(FilterOperator::Contains, "")]);
    }

    #[test]
    fn test_operator_per_segment() {
        assert_eq!(
            parse_default("~Joe,Doe"),
            vec![
                ValueFilter::new(FilterOperator::Contains, "Joe"),
                ValueFilter::new(FilterOperator::Default, "Doe"),
            ]
        );
        assert_eq!(
            parse_default("  >=5|<1;!3"),
            vec![
                ValueFilter::new(FilterOperator::GreaterThanOrEqual, "5"),
                ValueFilter::new(FilterOperator::LessThan, "1"),
                ValueFilter::new(FilterOperator::NotEqual, "3"),
            ]
        );
    }

    #[test]
    fn test_escaped_separators() {
        assert_eq!(
            parse_default(r"==a\,b,c\\,d\|e\;f"),
            vec![
                ValueFilter::new(FilterOperator::EqualCaseSensitive, "a,b"),
                ValueFilter::new(FilterOperator::Default, r"c\"),
                ValueFilter::new(FilterOperator::Default, "d|e;f"),
            ]
        );
    }

    #[test]
    fn test_lone_backslash_is_literal() {
        assert_eq!(unescape(r"a\b"), r"a\b");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_trailing_separator_yields_empty_value() {
        assert_eq!(
            parse_default("a,"),
            vec![
                ValueFilter::new(FilterOperator::Default, "a"),
                ValueFilter::new(FilterOperator::Default, ""),
            ]
        );
    }

    #[test]
    fn test_render_round_trip() {
        let table = OperatorTable::default();
        let filters = vec![
            ValueFilter::new(FilterOperator::StartsWith, r"a,b\c"),
            ValueFilter::nullary(FilterOperator::NotNull),
            ValueFilter::new(FilterOperator::Default, "plain"),
            ValueFilter::new(FilterOperator::EqualCaseSensitive, ""),
        ];
        let rendered = render(&filters, &table);
        assert_eq!(rendered, r"^a\,b\\c,NOTNULL,plain,==");
        assert_eq!(parse(&rendered, &table), filters);
    }

    #[test]
    fn test_custom_table() {
        let table = OperatorTable::from_pairs([
            ("eq:", FilterOperator::EqualCaseSensitive),
            ("null", FilterOperator::IsNull),
        ]);
        assert_eq!(
            parse("eq:x,null,==y", &table),
            vec![
                ValueFilter::new(FilterOperator::EqualCaseSensitive, "x"),
                ValueFilter::nullary(FilterOperator::IsNull),
                ValueFilter::new(FilterOperator::Default, "==y"),
            ]
        );
    }
}
