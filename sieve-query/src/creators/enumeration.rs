//! Enumeration properties registered with [`filter_enum!`](crate::filter_enum).

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, text_op, with_null_checks, ExpressionCreator, Operand};

/// Creator for enum properties.
///
/// Values are variant names (case-insensitive unless `==` is used) or
/// integer discriminants. A value outside the enum's domain matches nothing.
/// Substring operators match the variant name, ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::LessThan,
    FilterOperator::LessThanOrEqual,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterThanOrEqual,
];

impl ExpressionCreator for EnumCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        matches!(scalar, ScalarType::Enum(_))
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        operator: FilterOperator,
        raw: &str,
        field_type: &FieldType,
        _config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        let ScalarType::Enum(descriptor) = field_type.scalar else {
            return Err(FilterError::parse_failure(raw, field_type.scalar.name()));
        };
        let text = raw.trim();
        if operator.is_text_match() {
            return Ok(Operand::Text(text.to_string()));
        }

        let variant = match text.parse::<i64>() {
            Ok(discriminant) => descriptor.by_discriminant(discriminant),
            Err(_) => {
                let case_sensitive = operator == FilterOperator::EqualCaseSensitive;
                descriptor.by_name(text, case_sensitive)
            }
        };
        Ok(variant.map_or(Operand::Unmatched, |v| Operand::Value(Value::Enum(v))))
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        match operand {
            Operand::Unmatched => Ok(Expr::Const(operator == FilterOperator::NotEqual)),
            Operand::Text(text) => match text_op(operator) {
                Some(op) => Ok(Expr::text(property, op, text, false)),
                None => compare(operator, Operand::Text(text), property, field_type),
            },
            operand => compare(operator, operand, property, field_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, TextOp};
    use crate::value::{EnumDescriptor, EnumValue};
    use pretty_assertions::assert_eq;

    static SIGN: EnumDescriptor = EnumDescriptor {
        name: "Sign",
        variants: &[("Negative", -1), ("Zero", 0), ("Positive", 1)],
    };

    fn parse(operator: FilterOperator, raw: &str) -> Operand {
        EnumCreator
            .parse(
                operator,
                raw,
                &FieldType::required(ScalarType::Enum(&SIGN)),
                &FilterConfiguration::default(),
            )
            .unwrap()
    }

    fn variant(name: &'static str, discriminant: i64) -> Operand {
        Operand::Value(Value::Enum(EnumValue { name, discriminant }))
    }

    #[test]
    fn test_name_and_number() {
        assert_eq!(parse(FilterOperator::Default, "positive"), variant("Positive", 1));
        assert_eq!(parse(FilterOperator::Default, "-1"), variant("Negative", -1));
        assert_eq!(parse(FilterOperator::EqualCaseSensitive, "positive"), Operand::Unmatched);
        assert_eq!(parse(FilterOperator::EqualCaseSensitive, "Positive"), variant("Positive", 1));
    }

    #[test]
    fn test_out_of_domain_matches_nothing() {
        let field_type = FieldType::required(ScalarType::Enum(&SIGN));
        assert_eq!(parse(FilterOperator::Default, "42"), Operand::Unmatched);
        assert_eq!(
            EnumCreator
                .compile(FilterOperator::Default, Operand::Unmatched, "sign", &field_type)
                .unwrap(),
            Expr::Const(false)
        );
        assert_eq!(
            EnumCreator
                .compile(FilterOperator::NotEqual, Operand::Unmatched, "sign", &field_type)
                .unwrap(),
            Expr::Const(true)
        );
    }

    #[test]
    fn test_contains_matches_name() {
        let field_type = FieldType::required(ScalarType::Enum(&SIGN));
        let operand = parse(FilterOperator::Contains, "POS");
        assert_eq!(operand, Operand::Text("POS".into()));
        assert_eq!(
            EnumCreator
                .compile(FilterOperator::Contains, operand, "sign", &field_type)
                .unwrap(),
            Expr::text("sign", TextOp::Contains, "pos", false)
        );
    }

    #[test]
    fn test_ordering_uses_discriminant() {
        let field_type = FieldType::required(ScalarType::Enum(&SIGN));
        let expr = EnumCreator
            .compile(
                FilterOperator::GreaterThan,
                parse(FilterOperator::GreaterThan, "zero"),
                "sign",
                &field_type,
            )
            .unwrap();
        assert_eq!(
            expr,
            Expr::compare(
                "sign",
                CompareOp::Gt,
                Value::Enum(EnumValue {
                    name: "Zero",
                    discriminant: 0
                })
            )
        );
    }
}
