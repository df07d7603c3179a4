//! Predicate expression tree.
//!
//! An [`Expr`] is built once by the composer and evaluated many times against
//! [`Record`]s. Its `Display` form is a readable rendering meant for deferred
//! translators and logs:
//!
//! ```rust
//! use sieve_query::expr::{CompareOp, Expr, TextOp};
//! use sieve_query::Value;
//!
//! let expr = Expr::and([
//!     Expr::text("name", TextOp::Contains, "Jo", false),
//!     Expr::compare("age", CompareOp::Gte, Value::Int(18)),
//! ])
//! .unwrap();
//! assert_eq!(expr.to_string(), r#"(icontains(name, "jo") AND age >= 18)"#);
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::schema::{Nested, Record};
use crate::value::Value;

/// Property name inside an expression.
pub type FieldName = Cow<'static, str>;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    /// Get the operator symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

/// Text matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    fn apply(self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::Equals => haystack == needle,
            Self::Contains => haystack.contains(needle),
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
        }
    }

    fn function_name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
        }
    }
}

/// A boolean predicate over one entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant result.
    Const(bool),

    /// Compare a scalar property with a value.
    Compare {
        property: FieldName,
        op: CompareOp,
        value: Value,
    },

    /// Match the textual form of a scalar property. A null property never
    /// matches.
    Text {
        property: FieldName,
        op: TextOp,
        value: String,
        case_sensitive: bool,
    },

    /// The property holds no value.
    IsNull(FieldName),
    /// The property holds a value.
    IsNotNull(FieldName),

    /// Logical AND.
    And(Vec<Expr>),
    /// Logical OR.
    Or(Vec<Expr>),
    /// Logical NOT.
    Not(Box<Expr>),

    /// Apply a predicate to a nested object. A missing object never matches.
    Member {
        property: FieldName,
        predicate: Box<Expr>,
    },

    /// Some element of a nested collection satisfies the predicate.
    Any {
        property: FieldName,
        predicate: Box<Expr>,
    },
}

impl Expr {
    /// Create a comparison.
    pub fn compare(property: impl Into<FieldName>, op: CompareOp, value: Value) -> Self {
        Self::Compare {
            property: property.into(),
            op,
            value,
        }
    }

    /// Create a text match. Case-insensitive needles are stored lowercased.
    pub fn text(
        property: impl Into<FieldName>,
        op: TextOp,
        value: impl Into<String>,
        case_sensitive: bool,
    ) -> Self {
        let value = value.into();
        Self::Text {
            property: property.into(),
            op,
            value: if case_sensitive { value } else { value.to_lowercase() },
            case_sensitive,
        }
    }

    /// `property IS NULL`.
    pub fn is_null(property: impl Into<FieldName>) -> Self {
        Self::IsNull(property.into())
    }

    /// `property IS NOT NULL`.
    pub fn is_not_null(property: impl Into<FieldName>) -> Self {
        Self::IsNotNull(property.into())
    }

    /// Combine with AND, flattening nested conjunctions.
    ///
    /// Returns `None` for an empty input and the sole element for a
    /// single-element input.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Option<Self> {
        Self::combine(exprs, true)
    }

    /// Combine with OR, flattening nested disjunctions.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Option<Self> {
        Self::combine(exprs, false)
    }

    fn combine(exprs: impl IntoIterator<Item = Expr>, conjunction: bool) -> Option<Self> {
        let mut items = Vec::new();
        for expr in exprs {
            match expr {
                Self::And(inner) if conjunction => items.extend(inner),
                Self::Or(inner) if !conjunction => items.extend(inner),
                other => items.push(other),
            }
        }
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ if conjunction => Some(Self::And(items)),
            _ => Some(Self::Or(items)),
        }
    }

    /// Negate an expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Self::Not(Box::new(expr))
    }

    /// Apply `predicate` to the nested object behind `property`.
    pub fn member(property: impl Into<FieldName>, predicate: Expr) -> Self {
        Self::Member {
            property: property.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Require some element of the collection behind `property` to match.
    pub fn any(property: impl Into<FieldName>, predicate: Expr) -> Self {
        Self::Any {
            property: property.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate against a record.
    pub fn matches(&self, record: &dyn Record) -> bool {
        match self {
            Self::Const(result) => *result,
            Self::Compare {
                property,
                op,
                value,
            } => {
                let actual = record.value(property);
                match op {
                    CompareOp::Eq => actual.equals(value),
                    CompareOp::Ne => !actual.equals(value),
                    CompareOp::Lt => actual.compare(value).is_some_and(|o| o.is_lt()),
                    CompareOp::Lte => actual.compare(value).is_some_and(|o| o.is_le()),
                    CompareOp::Gt => actual.compare(value).is_some_and(|o| o.is_gt()),
                    CompareOp::Gte => actual.compare(value).is_some_and(|o| o.is_ge()),
                }
            }
            Self::Text {
                property,
                op,
                value,
                case_sensitive,
            } => {
                let actual = record.value(property);
                let Some(text) = actual.to_text() else {
                    return false;
                };
                if *case_sensitive {
                    op.apply(&text, value)
                } else {
                    op.apply(&text.to_lowercase(), value)
                }
            }
            Self::IsNull(property) => record.is_null(property),
            Self::IsNotNull(property) => !record.is_null(property),
            Self::And(exprs) => exprs.iter().all(|e| e.matches(record)),
            Self::Or(exprs) => exprs.iter().any(|e| e.matches(record)),
            Self::Not(expr) => !expr.matches(record),
            Self::Member {
                property,
                predicate,
            } => match record.nested(property) {
                Nested::One(inner) => predicate.matches(inner),
                Nested::Absent | Nested::Null | Nested::Many(_) => false,
            },
            Self::Any {
                property,
                predicate,
            } => match record.nested(property) {
                Nested::Many(items) => items.into_iter().any(|item| predicate.matches(item)),
                Nested::Absent | Nested::Null | Nested::One(_) => false,
            },
        }
    }

    fn fmt_path(&self, f: &mut fmt::Formatter<'_>, path: &str) -> fmt::Result {
        match self {
            Self::Const(true) => f.write_str("TRUE"),
            Self::Const(false) => f.write_str("FALSE"),
            Self::Compare {
                property,
                op,
                value,
            } => write!(f, "{}{} {} {}", path, property, op.as_str(), value),
            Self::Text {
                property,
                op,
                value,
                case_sensitive,
            } => {
                let prefix = if *case_sensitive { "" } else { "i" };
                write!(
                    f,
                    "{}{}({}{}, {:?})",
                    prefix,
                    op.function_name(),
                    path,
                    property,
                    value
                )
            }
            Self::IsNull(property) => write!(f, "{}{} IS NULL", path, property),
            Self::IsNotNull(property) => write!(f, "{}{} IS NOT NULL", path, property),
            Self::And(exprs) | Self::Or(exprs) => {
                let joiner = if matches!(self, Self::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    expr.fmt_path(f, path)?;
                }
                f.write_str(")")
            }
            Self::Not(expr) => {
                f.write_str("NOT ")?;
                expr.fmt_path(f, path)
            }
            Self::Member {
                property,
                predicate,
            } => predicate.fmt_path(f, &format!("{}{}.", path, property)),
            Self::Any {
                property,
                predicate,
            } => {
                write!(f, "{}{}.any(", path, property)?;
                predicate.fmt_path(f, "")?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_path(f, "")
    }
}
