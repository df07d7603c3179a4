//! Integer, floating point and decimal properties.
//!
//! Raw values are read with the configured locale first (its decimal
//! separator, plus group separators in groups of three) and with invariant
//! rules second. The result is narrowed to the property's type; values that
//! do not fit are an overflow, never clamped.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::locale::Locale;
use crate::operator::FilterOperator;
use crate::value::{FieldType, ScalarType, Value};

use super::{compare, with_null_checks, ExpressionCreator, Operand};

/// Creator for all numeric properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericCreator;

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

impl ExpressionCreator for NumericCreator {
    fn can_handle(&self, scalar: &ScalarType) -> bool {
        scalar.is_numeric()
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
        parse_number(raw, field_type.scalar, &config.locale).map(Operand::Value)
    }

    fn compile(
        &self,
        operator: FilterOperator,
        operand: Operand,
        property: &'static str,
        field_type: &FieldType,
    ) -> FilterResult<Expr> {
        if operator == FilterOperator::Contains {
            let value = operand.into_value(field_type)?;
            let text = value.to_text().map(|t| t.into_owned()).unwrap_or_default();
            return Ok(Expr::text(property, crate::expr::TextOp::Contains, text, true));
        }
        compare(operator, operand, property, field_type)
    }
}

/// Parse `raw` as a number of type `target`.
pub fn parse_number(raw: &str, target: ScalarType, locale: &Locale) -> FilterResult<Value> {
    let text = raw.trim();
    let normalized = normalize(text, locale).or_else(|| normalize(text, &Locale::invariant()));

    match target {
        ScalarType::F32 | ScalarType::F64 => {
            let parsed = match &normalized {
                Some(n) => n.parse::<f64>().ok(),
                None => text.parse::<f64>().ok(),
            };
            let Some(value) = parsed else {
                return Err(FilterError::parse_failure(raw, target.name()));
            };
            if value.is_nan() || (value.is_infinite() && normalized.is_none() && is_named_float(text)) {
                return Err(FilterError::parse_failure(raw, target.name()));
            }
            let limit = if target == ScalarType::F32 {
                f64::from(f32::MAX)
            } else {
                f64::MAX
            };
            if !value.is_finite() || value.abs() > limit {
                return Err(FilterError::overflow(raw, target.name()));
            }
            // Records widen `f32` fields, so the operand must carry the same rounding.
            if target == ScalarType::F32 {
                return Ok(Value::Float(f64::from(value as f32)));
            }
            Ok(Value::Float(value))
        }
        ScalarType::Decimal => {
            let parsed = match &normalized {
                Some(n) => Decimal::from_str(n).map_err(|_| FilterError::overflow(raw, "Decimal")),
                None => Decimal::from_scientific(text)
                    .map_err(|_| FilterError::parse_failure(raw, "Decimal")),
            };
            parsed.map(Value::Decimal)
        }
        _ => {
            let Some(normalized) = normalized else {
                return Err(FilterError::parse_failure(raw, target.name()));
            };
            let integer = match normalized.split_once('.') {
                Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
                Some(_) => return Err(FilterError::parse_failure(raw, target.name())),
                None => normalized.as_str(),
            };
            let value: i128 = match integer {
                "" | "-" | "+" => return Err(FilterError::parse_failure(raw, target.name())),
                digits => digits
                    .parse()
                    .map_err(|_| FilterError::overflow(raw, target.name()))?,
            };
            narrow(value, target).ok_or_else(|| FilterError::overflow(raw, target.name()))
        }
    }
}

fn is_named_float(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("inf") || lower.contains("nan")
}

/// Narrow an integer into the value for `target`.
fn narrow(value: i128, target: ScalarType) -> Option<Value> {
    let (min, max): (i128, i128) = match target {
        ScalarType::I8 => (i8::MIN.into(), i8::MAX.into()),
        ScalarType::I16 => (i16::MIN.into(), i16::MAX.into()),
        ScalarType::I32 => (i32::MIN.into(), i32::MAX.into()),
        ScalarType::I64 => (i64::MIN.into(), i64::MAX.into()),
        ScalarType::U8 => (0, u8::MAX.into()),
        ScalarType::U16 => (0, u16::MAX.into()),
        ScalarType::U32 => (0, u32::MAX.into()),
        ScalarType::U64 => (0, u64::MAX.into()),
        _ => return None,
    };
    if value < min || value > max {
        return None;
    }
    if target.is_integer() && min == 0 {
        u64::try_from(value).ok().map(Value::UInt)
    } else {
        i64::try_from(value).ok().map(Value::Int)
    }
}

/// Rewrite a locale-formatted number as `[-]digits[.digits]`.
///
/// Group separators are only accepted between groups of exactly three digits.
fn normalize(text: &str, locale: &Locale) -> Option<String> {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };

    let (integer, fraction) = match unsigned.split_once(locale.decimal_separator()) {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let groups: Vec<&str> = integer.split(|c| locale.is_group_separator(c)).collect();
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !groups.iter().all(|g| digits_only(g)) {
        return None;
    }
    if groups.len() > 1 {
        let (first, rest) = groups.split_first()?;
        if first.is_empty() || first.len() > 3 || rest.iter().any(|g| g.len() != 3) {
            return None;
        }
    }
    let integer = groups.concat();

    match fraction {
        Some(frac) if !digits_only(frac) || (frac.is_empty() && integer.is_empty()) => None,
        Some(frac) if frac.is_empty() => Some(format!("{}{}", sign, integer)),
        Some(frac) => Some(format!("{}{}.{}", sign, if integer.is_empty() { "0" } else { &integer }, frac)),
        None if integer.is_empty() => None,
        None => Some(format!("{}{}", sign, integer)),
    }
}
