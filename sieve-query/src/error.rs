//! Error types for filter construction and predicate compilation.
//!
//! Every error carries enough context (entity, property, operator, offending
//! value) to build a precise message without consulting the filter again.
//!
//! ```rust
//! use sieve_query::{FilterError, FilterOperator};
//!
//! let err = FilterError::unsupported_operator(
//!     "Person",
//!     "age",
//!     "i32",
//!     FilterOperator::StartsWith,
//!     &[FilterOperator::Default, FilterOperator::LessThan],
//! );
//! assert!(err.to_string().contains("StartsWith"));
//! assert!(err.to_string().contains("Person.age"));
//! assert!(err.to_string().contains("i32"));
//! ```

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use crate::operator::FilterOperator;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while building or compiling filters.
#[derive(Error, Debug, Diagnostic)]
pub enum FilterError {
    /// The operator is outside the set supported by the property's type family.
    #[error(
        "operator `{operator}` is not supported for `{entity}.{property}` of type `{field_type}` (supported: {})",
        join_operators(.supported)
    )]
    #[diagnostic(code(sieve::filter::unsupported_operator))]
    UnsupportedOperator {
        entity: String,
        property: String,
        field_type: String,
        operator: FilterOperator,
        supported: Vec<FilterOperator>,
    },

    /// A raw value could not be converted to the property's type.
    #[error("cannot parse `{value}` as {target} for `{entity}.{property}`")]
    #[diagnostic(
        code(sieve::filter::value_parse_failure),
        help("set `ignore_parse_errors` to omit unparsable values instead")
    )]
    ValueParseFailure {
        entity: String,
        property: String,
        value: String,
        target: String,
    },

    /// A numeric value does not fit into the property's numeric type.
    #[error("value `{value}` is out of range for {target} in `{entity}.{property}`")]
    #[diagnostic(code(sieve::filter::numeric_overflow))]
    NumericOverflow {
        entity: String,
        property: String,
        value: String,
        target: String,
    },

    /// The caller referenced something other than a first-level property.
    #[error("invalid property `{property}` on `{entity}`: {reason}")]
    #[diagnostic(code(sieve::filter::invalid_property))]
    InvalidPropertyExpression {
        entity: String,
        property: String,
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(sieve::config::invalid))]
    Config { message: String },

    /// Error reading a configuration file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(sieve::config::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(sieve::config::toml_error))]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    /// Unknown locale tag.
    #[error("unknown locale `{tag}`")]
    #[diagnostic(
        code(sieve::config::unknown_locale),
        help("supported locales: invariant, en-US, en-GB, de-DE, fr-FR, nl-NL, ja-JP")
    )]
    UnknownLocale { tag: String },
}

impl FilterError {
    /// Create an unsupported operator error.
    pub fn unsupported_operator(
        entity: impl Into<String>,
        property: impl Into<String>,
        field_type: impl Into<String>,
        operator: FilterOperator,
        supported: &[FilterOperator],
    ) -> Self {
        Self::UnsupportedOperator {
            entity: entity.into(),
            property: property.into(),
            field_type: field_type.into(),
            operator,
            supported: supported.to_vec(),
        }
    }

    /// Create a parse failure that is not yet bound to a property.
    pub fn parse_failure(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::ValueParseFailure {
            entity: String::new(),
            property: String::new(),
            value: value.into(),
            target: target.into(),
        }
    }

    /// Create an overflow error that is not yet bound to a property.
    pub fn overflow(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::NumericOverflow {
            entity: String::new(),
            property: String::new(),
            value: value.into(),
            target: target.into(),
        }
    }

    /// Create an invalid property error.
    pub fn invalid_property(
        entity: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPropertyExpression {
            entity: entity.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Bind a value-level error to the entity and property it occurred on.
    ///
    /// Errors that already carry a location are returned unchanged.
    pub fn in_property(mut self, entity_name: &str, property_name: &str) -> Self {
        match &mut self {
            Self::UnsupportedOperator {
                entity, property, ..
            }
            | Self::ValueParseFailure {
                entity, property, ..
            }
            | Self::NumericOverflow {
                entity, property, ..
            } => {
                if entity.is_empty() {
                    *entity = entity_name.to_string();
                }
                if property.is_empty() {
                    *property = property_name.to_string();
                }
            }
            _ => {}
        }
        self
    }

    /// Whether the error policy may suppress this error.
    ///
    /// Only value-level failures are suppressible; operator and property
    /// errors always surface.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::ValueParseFailure { .. } | Self::NumericOverflow { .. }
        )
    }
}

fn join_operators(operators: &[FilterOperator]) -> String {
    operators
        .iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operator_message() {
        let err = FilterError::unsupported_operator(
            "Person",
            "active",
            "bool",
            FilterOperator::Contains,
            &[FilterOperator::Default, FilterOperator::NotEqual],
        );
        let message = err.to_string();
        assert!(message.contains("`Contains`"));
        assert!(message.contains("Person.active"));
        assert!(message.contains("`bool`"));
        assert!(message.contains("Default, NotEqual"));
    }

    #[test]
    fn test_in_property_fills_location() {
        let err = FilterError::parse_failure("abc", "i32").in_property("Person", "age");
        match err {
            FilterError::ValueParseFailure {
                entity,
                property,
                value,
                target,
            } => {
                assert_eq!(entity, "Person");
                assert_eq!(property, "age");
                assert_eq!(value, "abc");
                assert_eq!(target, "i32");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_property_keeps_existing_location() {
        let err = FilterError::overflow("300", "u8")
            .in_property("Address", "number")
            .in_property("Person", "address");
        assert!(err.to_string().contains("Address.number"));
    }

    #[test]
    fn test_value_error_classification() {
        assert!(FilterError::parse_failure("x", "bool").is_value_error());
        assert!(FilterError::overflow("1e400", "f64").is_value_error());
        assert!(!FilterError::config("bad").is_value_error());
    }
}
