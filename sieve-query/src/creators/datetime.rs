//! Date and timestamp properties.

use chrono::Offset;

use crate::config::FilterConfiguration;
use crate::datetime;
use crate::error::{FilterError, FilterResult};
use crate::expr::{CompareOp, Expr};
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, with_null_checks, ExpressionCreator, Operand};

/// Creator for `NaiveDate`, `NaiveDateTime` and offset timestamps.
///
/// Every parsed value is a half-open range. `Default` and `Contains` test
/// membership in the range; the other operators use its start.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCreator;

const OPERATORS: &[FilterOperator] = &[
    FilterOperator::Default,
    FilterOperator::Contains,
    FilterOperator::EqualCaseSensitive,
    FilterOperator::EqualCaseInsensitive,
    FilterOperator::NotEqual,
    FilterOperator::LessThan,
    FilterOperator::LessThanOrEqual,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterThanOrEqual,
];

impl ExpressionCreator for DateTimeCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        matches!(
            scalar,
            ScalarType::Date | ScalarType::DateTime | ScalarType::DateTimeOffset
        )
    }

    fn supported_operators(&self, field_type: &FieldType) -> Vec<FilterOperator> {
        with_null_checks(field_type, OPERATORS)
    }

    fn parse(
        &self,
        _operator: FilterOperator,
        raw: &str,
        field_type: &FieldType,
        config: &FilterConfiguration,
    ) -> FilterResult<Operand> {
        let target = field_type.scalar;
        let failure = || FilterError::parse_failure(raw, target.name());
        let span = datetime::parse(raw, config).ok_or_else(failure)?;

        let (start, end) = match target {
            ScalarType::Date => {
                let (start, end) = span.dates().ok_or_else(failure)?;
                (Value::Date(start), Value::Date(end))
            }
            ScalarType::DateTime => {
                let (start, end) = span.naive();
                (Value::DateTime(start), Value::DateTime(end))
            }
            _ => {
                let offset = config.clock.now().offset().fix();
                let (start, end) = span.with_offset(offset).ok_or_else(failure)?;
                (Value::DateTimeOffset(start), Value::DateTimeOffset(end))
            }
        };
        Ok(Operand::Range { start, end })
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        match (operator, operand) {
            (FilterOperator::Default | FilterOperator::Contains, Operand::Range { start, end }) => {
                Ok(Expr::And(vec![
                    Expr::compare(property, CompareOp::Gte, start),
                    Expr::compare(property, CompareOp::Lt, end),
                ]))
            }
            (operator, operand) => compare(operator, operand, property, field_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Clock;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn config() -> FilterConfiguration {
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 16, 12, 0, 0)
            .unwrap();
        FilterConfiguration::default().with_clock(Clock::fixed(now))
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_year_is_half_open_range() {
        let field_type = FieldType::required(ScalarType::Date);
        let operand = DateTimeCreator
            .parse(FilterOperator::Default, "2010", &field_type, &config())
            .unwrap();
        assert_eq!(
            operand,
            Operand::Range {
                start: date(2010, 1, 1),
                end: date(2011, 1, 1)
            }
        );
        let expr = DateTimeCreator
            .compile(FilterOperator::Default, operand, "born", &field_type)
            .unwrap();
        assert_eq!(
            expr,
            Expr::And(vec![
                Expr::compare("born", CompareOp::Gte, date(2010, 1, 1)),
                Expr::compare("born", CompareOp::Lt, date(2011, 1, 1)),
            ])
        );
    }

    #[test]
    fn test_equal_and_ordering_use_start() {
        let field_type = FieldType::required(ScalarType::Date);
        for (operator, op) in [
            (FilterOperator::EqualCaseSensitive, CompareOp::Eq),
            (FilterOperator::NotEqual, CompareOp::Ne),
            (FilterOperator::GreaterThan, CompareOp::Gt),
        ] {
            let operand = DateTimeCreator
                .parse(operator, "2010-05", &field_type, &config())
                .unwrap();
            let expr = DateTimeCreator
                .compile(operator, operand, "born", &field_type)
                .unwrap();
            assert_eq!(expr, Expr::compare("born", op, date(2010, 5, 1)));
        }
    }

    #[test]
    fn test_offset_defaults_to_clock() {
        let field_type = FieldType::required(ScalarType::DateTimeOffset);
        let operand = DateTimeCreator
            .parse(FilterOperator::Default, "2020-01-01", &field_type, &config())
            .unwrap();
        let Operand::Range {
            start: Value::DateTimeOffset(start),
            ..
        } = operand
        else {
            panic!("expected an offset range");
        };
        assert_eq!(start.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_unparsable() {
        let field_type = FieldType::nullable(ScalarType::DateTime);
        let err = DateTimeCreator
            .parse(FilterOperator::Default, "someday", &field_type, &config())
            .unwrap_err();
        assert!(err.is_value_error());
        assert!(DateTimeCreator
            .supported_operators(&field_type)
            .contains(&FilterOperator::IsNull));
    }
}
