//! Fallback for types without a dedicated creator.

use chrono::NaiveTime;

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, with_null_checks, ExpressionCreator, Operand};

/// Permissive creator used when no other creator handles a type.
///
/// Supports equality and ordering through the value's native comparison.
/// Parses `char` (exactly one character) and `NaiveTime`
/// (`HH:MM`, `HH:MM:SS` or with fractional seconds).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::LessThan,
    FilterOperator::LessThanOrEqual,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterThanOrEqual,
];

impl ExpressionCreator for DefaultCreator {
    fn can_handle(&self, _scalar: &ScalarType) -> bool {
        true
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        _operator: FilterOperator,
        raw: &str,
        field_type: &FieldType,
        _config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        let failure = || FilterError::parse_failure(raw, field_type.scalar.name());
        let value = match field_type.scalar {
            ScalarType::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(failure()),
                }
            }
            ScalarType::Time => {
                let text = raw.trim();
                ["%H:%M:%S%.f", "%H:%M"]
                    .iter()
                    .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                    .map(Value::Time)
                    .ok_or_else(failure)?
            }
            _ => return Err(failure()),
        };
        Ok(Operand::Value(value))
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        compare(operator, operand, property, field_type)
    }
}
