//! Boolean properties.

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, with_null_checks, ExpressionCreator, Operand};

/// Creator for `bool` properties.
///
/// Accepts `true`/`false` and the configured literal sets, ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
];

impl ExpressionCreator for BoolCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        *scalar == ScalarType::Bool
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        _operator: FilterOperator,
        raw: &str,
        _field_type: &FieldType,
        config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        let text = raw.trim();
        let is = |literals: &[String]| literals.iter().any(|l| l.eq_ignore_ascii_case(text));

        let value = if text.eq_ignore_ascii_case("true") || is(&config.true_literals) {
            true
        } else if text.eq_ignore_ascii_case("false") || is(&config.false_literals) {
            false
        } else {
            return Err(FilterError::parse_failure(raw, "bool"));
        };
        Ok(Operand::Value(Value::Bool(value)))
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
