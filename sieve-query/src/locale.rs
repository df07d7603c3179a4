//! Locale presets for number and date parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Order of day, month and year in numeric dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `03/04/2020` is March 4th.
    MonthDayYear,
    /// `03/04/2020` is April 3rd.
    DayMonthYear,
    /// `2020/04/03` is April 3rd.
    YearMonthDay,
}

/// Number and date conventions of a culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: &'static str,
    decimal_separator: char,
    group_separator: Option<char>,
    date_order: DateOrder,
}

const PRESETS: &[Locale] = &[
    Locale::preset("invariant", '.', Some(','), DateOrder::MonthDayYear),
    Locale::preset("en-US", '.', Some(','), DateOrder::MonthDayYear),
    Locale::preset("en-GB", '.', Some(','), DateOrder::DayMonthYear),
    Locale::preset("de-DE", ',', Some('.'), DateOrder::DayMonthYear),
    Locale::preset("fr-FR", ',', Some('\u{202f}'), DateOrder::DayMonthYear),
    Locale::preset("nl-NL", ',', Some('.'), DateOrder::DayMonthYear),
    Locale::preset("ja-JP", '.', Some(','), DateOrder::YearMonthDay),
];

impl Locale {
    const fn preset(
        tag: &'static str,
        decimal_separator: char,
        group_separator: Option<char>,
        date_order: DateOrder,
    ) -> Self {
        Self {
            tag,
            decimal_separator,
            group_separator,
            date_order,
        }
    }

    /// Culture-neutral conventions (`.` decimal point, month-first dates).
    pub fn invariant() -> Self {
        PRESETS[0].clone()
    }

    /// Look up a preset by tag, ignoring ASCII case and `_`/`-` differences.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.replace('_', "-");
        PRESETS
            .iter()
            .find(|l| l.tag.eq_ignore_ascii_case(&normalized))
            .cloned()
    }

    /// The locale tag.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Decimal separator.
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Digit group separator.
    pub fn group_separator(&self) -> Option<char> {
        self.group_separator
    }

    /// Day/month/year order.
    pub fn date_order(&self) -> DateOrder {
        self.date_order
    }

    /// Whether `c` is a group separator here. French also accepts plain
    /// and non-breaking spaces.
    pub(crate) fn is_group_separator(&self, c: char) -> bool {
        match self.group_separator {
            Some('\u{202f}') => matches!(c, '\u{202f}' | '\u{a0}' | ' '),
            Some(sep) => c == sep,
            None => false,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl FromStr for Locale {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| FilterError::UnknownLocale { tag: s.to_string() })
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let de = Locale::from_tag("de_de").unwrap();
        assert_eq!(de.tag(), "de-DE");
        assert_eq!(de.decimal_separator(), ',');
        assert_eq!(de.date_order(), DateOrder::DayMonthYear);
        assert!(Locale::from_tag("xx-XX").is_none());
    }

    #[test]
    fn test_from_str_error() {
        let err = "klingon".parse::<Locale>().unwrap_err();
        assert!(matches!(err, FilterError::UnknownLocale { .. }));
    }

    #[test]
    fn test_french_spaces() {
        let fr = Locale::from_tag("fr-FR").unwrap();
        assert!(fr.is_group_separator(' '));
        assert!(fr.is_group_separator('\u{a0}'));
        assert!(!fr.is_group_separator('.'));
    }
}
