//! UUID properties.

use uuid::Uuid;

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, text_op, with_null_checks, ExpressionCreator, Operand};

/// Creator for `Uuid` properties.
///
/// Equality values accept every form `uuid` parses (hyphenated, simple,
/// braced, urn) in any case. Substring operators match the lowercase
/// hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
];

impl ExpressionCreator for UuidCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        *scalar == ScalarType::Uuid
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        operator: FilterOperator,
        raw: &str,
        _field_type: &FieldType,
        _config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        let text = raw.trim();
        if operator.is_text_match() {
            return Ok(Operand::Text(text.to_lowercase()));
        }
        Uuid::parse_str(text)
            .map(|id| Operand::Value(Value::Uuid(id)))
            .map_err(|_| FilterError::parse_failure(raw, "Uuid"))
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        match (text_op(operator), operand) {
            (Some(op), Operand::Text(text)) => Ok(Expr::text(property, op, text, false)),
            (_, operand) => compare(operator, operand, property, field_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, TextOp};
    use pretty_assertions::assert_eq;

    const ID: &str = "67E55044-10B1-426F-9247-BB680E5FE0C8";

    fn compile(operator: FilterOperator, raw: &str) -> FilterResult<Expr> {
        let field_type = FieldType::required(ScalarType::Uuid);
        let operand = UuidCreator.parse(operator, raw, &field_type, &FilterConfiguration::default())?;
        UuidCreator.compile(operator, operand, "id", &field_type)
    }

    #[test]
    fn test_equality_ignores_case() {
        let expected = Uuid::parse_str(&ID.to_lowercase()).unwrap();
        assert_eq!(
            compile(FilterOperator::Default, ID).unwrap(),
            Expr::compare("id", CompareOp::Eq, Value::Uuid(expected))
        );
        assert_eq!(
            compile(FilterOperator::NotEqual, "67e5504410b1426f9247bb680e5fe0c8").unwrap(),
            Expr::compare("id", CompareOp::Ne, Value::Uuid(expected))
        );
    }

    #[test]
    fn test_prefix_match() {
        assert_eq!(
            compile(FilterOperator::StartsWith, "67E5").unwrap(),
            Expr::text("id", TextOp::StartsWith, "67e5", false)
        );
    }

    #[test]
    fn test_invalid_and_unsupported() {
        assert!(compile(FilterOperator::Default, "not-a-uuid").unwrap_err().is_value_error());
        let ops = UuidCreator.supported_operators(&FieldType::nullable(ScalarType::Uuid));
        assert!(!ops.contains(&FilterOperator::LessThan));
        assert!(ops.contains(&FilterOperator::IsNull));
    }
}
