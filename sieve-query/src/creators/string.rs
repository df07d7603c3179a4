//! String properties.

use crate::config::FilterConfiguration;
use crate::error::FilterResult;
use crate::expr::{Expr, TextOp};
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType};

use super::{text_op, with_null_checks, ExpressionCreator, Operand};

/// Creator for `String` properties.
///
/// `Default` and `Contains` are case-insensitive substring matches that never
/// match a null value, even for an empty needle. `NotEqual` negates
/// `Contains`, so it matches null.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
];

impl ExpressionCreator for StringCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        *scalar == ScalarType::String
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        _operator: FilterOperator,
        raw: &str,
        _field_type: &FieldType,
        _config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        Ok(Operand::Text(raw.to_string()))
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        let text = match operand {
            Operand::Text(text) => text,
            other => other
                .into_value(field_type)?
                .to_text()
                .map(|t| t.into_owned())
                .unwrap_or_default(),
        };
        Ok(match operator {
            FilterOperator::EqualCaseSensitive => Expr::text(property, TextOp::Equals, text, true),
            FilterOperator::EqualCaseInsensitive => {
                Expr::text(property, TextOp::Equals, text, false)
            }
            FilterOperator::NotEqual => {
                Expr::not(Expr::text(property, TextOp::Contains, text, false))
            }
            other => {
                let op = text_op(other).unwrap_or(TextOp::Contains);
                Expr::text(property, op, text, false)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(operator: FilterOperator, raw: &str) -> Expr {
        let field_type = FieldType::nullable(ScalarType::String);
        let operand = StringCreator
            .parse(operator, raw, &field_type, &FilterConfiguration::default())
            .unwrap();
        StringCreator
            .compile(operator, operand, "name", &field_type)
            .unwrap()
    }

    #[test]
    fn test_default_is_case_insensitive_contains() {
        assert_eq!(
            compile(FilterOperator::Default, "Jo"),
            Expr::text("name", TextOp::Contains, "jo", false)
        );
        assert_eq!(
            compile(FilterOperator::EndsWith, "SON"),
            Expr::text("name", TextOp::EndsWith, "son", false)
        );
    }

    #[test]
    fn test_equality_and_negation() {
        assert_eq!(
            compile(FilterOperator::EqualCaseSensitive, "Jo"),
            Expr::text("name", TextOp::Equals, "Jo", true)
        );
        assert_eq!(
            compile(FilterOperator::NotEqual, ""),
            Expr::not(Expr::text("name", TextOp::Contains, "", false))
        );
    }

    #[test]
    fn test_no_ordering() {
        let ops = StringCreator.supported_operators(&FieldType::required(ScalarType::String));
        assert!(ops.iter().all(|op| !op.is_ordering()));
    }
}
