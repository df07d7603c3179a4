//! The atomic filter unit: one operator and at most one raw value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::operator::{FilterOperator, OperatorTable};
use crate::schema::FilterField;
use crate::syntax;

/// One operator plus its raw value.
///
/// Values stay raw until compilation so the same filter can be compiled
/// against different configurations. `IsNull`/`NotNull` never carry a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueFilter {
    operator: FilterOperator,
    value: Option<String>,
}

impl ValueFilter {
    /// Create a filter from an operator and a raw value.
    ///
    /// The value is dropped for nullary operators.
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        if operator.is_nullary() {
            return Self::nullary(operator);
        }
        Self {
            operator,
            value: Some(value.into()),
        }
    }

    /// Create a filter without a value.
    pub fn nullary(operator: FilterOperator) -> Self {
        Self {
            operator,
            value: None,
        }
    }

    /// `IS NULL` filter.
    pub fn is_null() -> Self {
        Self::nullary(FilterOperator::IsNull)
    }

    /// `NOT NULL` filter.
    pub fn not_null() -> Self {
        Self::nullary(FilterOperator::NotNull)
    }

    /// Create a filter from a typed value, bypassing the micro-syntax.
    ///
    /// The value is stored in its canonical text form (ISO-8601 dates,
    /// hyphenated UUIDs, variant names). A null value is stored as the empty
    /// string.
    pub fn create<V: FilterField>(operator: FilterOperator, value: V) -> Self {
        let text = value
            .to_value()
            .to_text()
            .map(|t| t.into_owned())
            .unwrap_or_default();
        Self::new(operator, text)
    }

    /// Parse micro-syntax with the default operator table.
    pub fn parse(text: &str) -> Vec<Self> {
        syntax::parse(text, &OperatorTable::default())
    }

    /// The operator.
    #[inline]
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// The raw value.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Render as micro-syntax with the default operator table.
    pub fn to_syntax(&self) -> String {
        syntax::render_one(self, &OperatorTable::default())
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_syntax())
    }
}

impl Serialize for ValueFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_syntax())
    }
}

impl<'de> Deserialize<'de> for ValueFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut filters = Self::parse(&text);
        if filters.len() != 1 {
            return Err(serde::de::Error::custom(format!(
                "expected a single value filter, found {} in `{}`",
                filters.len(),
                text
            )));
        }
        Ok(filters.remove(0))
    }
}
