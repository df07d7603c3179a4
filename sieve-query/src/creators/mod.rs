//! Type expression creators.
//!
//! A creator turns one [`ValueFilter`](crate::ValueFilter) on a scalar
//! property into an [`Expr`] fragment. Each scalar type family has its own
//! creator; the [`CreatorRegistry`] picks the first one whose
//! [`can_handle`](ExpressionCreator::can_handle) accepts the property's type
//! and falls back to [`DefaultCreator`].
//!
//! Compilation of one value runs in two steps so the error policy can be
//! applied between them:
//!
//! 1. [`parse`](ExpressionCreator::parse) converts the raw text into an
//!    [`Operand`], failing with a value-level error.
//! 2. [`compile`](ExpressionCreator::compile) builds the expression.
//!
//! Custom creators can be registered ahead of the built-ins:
//!
//! ```rust
//! use sieve_query::creators::{CreatorRegistry, ExpressionCreator, Operand};
//! use sieve_query::expr::{CompareOp, Expr};
//! use sieve_query::{FieldType, FilterConfiguration, FilterOperator, FilterResult, ScalarType, Value};
//!
//! /// Compares `char` properties by their ASCII code.
//! struct AsciiCode;
//!
//! impl ExpressionCreator for AsciiCode {
//!     fn can_handle(&self, scalar: &ScalarType) -> bool {
//!         *scalar == ScalarType::Char
//!     }
//!
//!     fn supported_operators(&self, _: &FieldType) -> Vec<FilterOperator> {
//!         vec![FilterOperator::Default]
//!     }
//!
//!     fn parse(&self, _: FilterOperator, raw: &str, _: &FieldType, _: &FilterConfiguration) -> FilterResult<Operand> {
//!         let code: u8 = raw.trim().parse().map_err(|_| sieve_query::FilterError::parse_failure(raw, "ascii code"))?;
//!         Ok(Operand::Value(Value::Char(char::from(code))))
//!     }
//!
//!     fn compile(&self, _: FilterOperator, operand: Operand, property: &'static str, field_type: &FieldType) -> FilterResult<Expr> {
//!         Ok(Expr::compare(property, CompareOp::Eq, operand.into_value(field_type)?))
//!     }
//! }
//!
//! let mut registry = CreatorRegistry::default();
//! registry.prepend(AsciiCode);
//! assert_eq!(registry.resolve(&ScalarType::Char).name(), std::any::type_name::<AsciiCode>());
//! ```

mod boolean;
mod datetime;
mod default;
mod enumeration;
mod numeric;
mod string;
mod uuid;

pub use self::boolean::BoolCreator;
pub use self::datetime::DateTimeCreator;
pub use self::default::DefaultCreator;
pub use self::enumeration::EnumCreator;
pub use self::numeric::NumericCreator;
pub use self::string::StringCreator;
pub use self::uuid::UuidCreator;

use std::fmt;
use std::sync::Arc;

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::{CompareOp, Expr, TextOp};
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

/// A parsed raw value, ready for compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single typed value.
    Value(Value),
    /// A half-open range `[start, end)`.
    Range { start: Value, end: Value },
    /// Text for substring matching.
    Text(String),
    /// A well-formed value outside the property's domain.
    Unmatched,
}

impl Operand {
    /// The single typed value, or a parse failure naming the target type.
    pub fn into_value(self, field_type: &FieldType) -> FilterResult<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Range { start, .. } => Ok(start),
            other => Err(FilterError::parse_failure(
                format!("{:?}", other),
                field_type.scalar.name(),
            )),
        }
    }
}

/// Compiles value filters for one family of scalar types.
pub trait ExpressionCreator: Send + Sync {
    /// Name of this creator (for debugging/logging).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this creator handles properties of `scalar` type.
    fn can_handle(&self, scalar: &ScalarType) -> bool;

    /// Operators accepted for a property of `field_type`.
    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator>;

    /// Convert a raw value into an operand for `operator`.
    fn parse(
        &self,
        operator: FilterOperator,
        raw: &str,
        field_type: &FieldType,
        config: &FilterConfiguration,
    ) -> FilterResult<Operand>;

    /// Build the expression for one parsed value.
    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr>;
}

/// A creator shared between registries.
pub type SharedCreator = Arc<dyn ExpressionCreator>;

/// Ordered list of creators with a permissive fallback.
#[derive(Clone)]
pub struct CreatorRegistry {
    creators: Vec<SharedCreator>,
    fallback: SharedCreator,
}

impl CreatorRegistry {
    /// Create a registry without built-in creators; only the fallback applies.
    pub fn empty() -> Self {
        Self {
            creators: Vec::new(),
            fallback: Arc::new(DefaultCreator),
        }
    }

    /// Add a creator after the existing ones.
    pub fn push<C: ExpressionCreator + 'static>(&mut self, creator: C) {
        self.creators.push(Arc::new(creator));
    }

    /// Add a creator ahead of the existing ones.
    pub fn prepend<C: ExpressionCreator + 'static>(&mut self, creator: C) {
        self.creators.insert(0, Arc::new(creator));
    }

    /// Get the number of registered creators, excluding the fallback.
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Check if no creators are registered.
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// First creator that handles `scalar`, or the fallback.
    pub fn resolve(&self, scalar: &ScalarType) -> &dyn ExpressionCreator {
        self.creators
            .iter()
            .find(|c| c.can_handle(scalar))
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for CreatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.push(BoolCreator);
        registry.push(NumericCreator);
        registry.push(DateTimeCreator);
        registry.push(EnumCreator);
        registry.push(UuidCreator);
        registry.push(StringCreator);
        registry
    }
}

impl fmt::Debug for CreatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.creators.iter().map(|c| c.name()))
            .entry(&self.fallback.name())
            .finish()
    }
}

/// `operators` plus `IsNull`/`NotNull` when the field is nullable.
pub(crate) fn with_null_checks(
    field_type: &FieldType,
    operators: &[FilterOperator],
) -> Vec<FilterOperator> {
    let mut supported = operators.to_vec();
    if field_type.nullable {
        supported.extend([FilterOperator::IsNull, FilterOperator::NotNull]);
    }
    supported
}

/// Map equality and ordering operators to a comparison.
pub(crate) fn compare_op(operator: FilterOperator) -> Option<CompareOp> {
    Some(match operator {
        FilterOperator::Default
        | FilterOperator::EqualCaseSensitive
        | FilterOperator::EqualCaseInsensitive => CompareOp::Eq,
        FilterOperator::NotEqual => CompareOp::Ne,
        FilterOperator::LessThan => CompareOp::Lt,
        FilterOperator::LessThanOrEqual => CompareOp::Lte,
        FilterOperator::GreaterThan => CompareOp::Gt,
        FilterOperator::GreaterThanOrEqual => CompareOp::Gte,
        _ => return None,
    })
}

/// Map substring operators to a text match.
pub(crate) fn text_op(operator: FilterOperator) -> Option<TextOp> {
    Some(match operator {
        FilterOperator::Contains => TextOp::Contains,
        FilterOperator::StartsWith => TextOp::StartsWith,
        FilterOperator::EndsWith => TextOp::EndsWith,
        _ => return None,
    })
}

/// Comparison of a property with a single value.
pub(crate) fn compare(
    operator: FilterOperator,
    operand: Operand,
    property: &'static str,
    field_type: &FieldType,
) -> FilterResult<Expr> {
    let op = compare_op(operator).ok_or_else(|| {
        FilterError::unsupported_operator("", property, field_type.to_string(), operator, &[])
    })?;
    Ok(Expr::compare(property, op, operand.into_value(field_type)?))
}
