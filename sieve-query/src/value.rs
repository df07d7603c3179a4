//! Runtime values and property type descriptors.
//!
//! A [`Value`] is what a [`Record`](crate::schema::Record) hands out for a
//! property and what compiled predicates compare against. [`FieldType`]
//! describes a property's declared type so creators can be dispatched and
//! raw values narrowed before evaluation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Static description of a filterable enumeration.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Type name.
    pub name: &'static str,
    /// Variants as `(name, discriminant)` in declaration order.
    pub variants: &'static [(&'static str, i64)],
}

impl EnumDescriptor {
    /// Look up a variant by name.
    pub fn by_name(&self, name: &str, case_sensitive: bool) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|(variant, _)| {
                if case_sensitive {
                    *variant == name
                } else {
                    variant.eq_ignore_ascii_case(name)
                }
            })
            .map(|&(name, discriminant)| EnumValue { name, discriminant })
    }

    /// Look up a variant by discriminant.
    pub fn by_discriminant(&self, discriminant: i64) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|(_, value)| *value == discriminant)
            .map(|&(name, discriminant)| EnumValue { name, discriminant })
    }
}

/// A single enumeration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Variant name.
    pub name: &'static str,
    /// Numeric discriminant.
    pub discriminant: i64,
}

/// Scalar type of a filterable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    String,
    Char,
    /// Calendar date.
    Date,
    /// Date and time without offset.
    DateTime,
    /// Date and time with a UTC offset.
    DateTimeOffset,
    /// Time of day.
    Time,
    Uuid,
    Enum(&'static EnumDescriptor),
}

impl ScalarType {
    /// Type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Char => "char",
            Self::Date => "NaiveDate",
            Self::DateTime => "NaiveDateTime",
            Self::DateTimeOffset => "DateTime<FixedOffset>",
            Self::Time => "NaiveTime",
            Self::Uuid => "Uuid",
            Self::Enum(descriptor) => descriptor.name,
        }
    }

    /// Integer, floating point or decimal.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }

    /// Signed or unsigned integer.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::U16 | Self::U32 | Self::U64
        )
    }

    /// Date, date-time or date-time with offset.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::DateTimeOffset)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a property: a scalar plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    /// Scalar type.
    pub scalar: ScalarType,
    /// Whether the property may hold no value.
    pub nullable: bool,
}

impl FieldType {
    /// A non-nullable field.
    pub const fn required(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: false,
        }
    }

    /// A nullable field.
    pub const fn nullable(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: true,
        }
    }

    /// Whether a value of `source` can be stored in a field of this type.
    pub fn accepts(&self, source: &FieldType) -> bool {
        self.scalar == source.scalar && (self.nullable || !source.nullable)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    Bool(bool),
    /// Signed integer of any width.
    Int(i64),
    /// Unsigned integer of any width.
    UInt(u64),
    /// Floating point of any width.
    Float(f64),
    Decimal(Decimal),
    String(String),
    Char(char),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Time(NaiveTime),
    Uuid(Uuid),
    Enum(EnumValue),
}

impl Value {
    /// Check if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compare two values of compatible types.
    ///
    /// Returns `None` for nulls and incompatible types.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (UInt(a), UInt(b)) => Some(a.cmp(b)),
            (Int(a), UInt(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (UInt(a), Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (Decimal(_), _) | (_, Decimal(_)) => {
                let (a, b) = (self.as_decimal()?, other.as_decimal()?);
                Some(a.cmp(&b))
            }
            (Float(_), _) | (_, Float(_)) => self.as_f64()?.partial_cmp(&other.as_f64()?),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Char(a), Char(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            (DateTimeOffset(a), DateTimeOffset(b)) => Some(a.cmp(b)),
            (Date(a), DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (DateTime(a), Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            (DateTime(a), DateTimeOffset(b)) => Some(a.cmp(&b.naive_utc())),
            (DateTimeOffset(a), DateTime(b)) => Some(a.naive_utc().cmp(b)),
            (Time(a), Time(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Enum(a), Enum(b)) => Some(a.discriminant.cmp(&b.discriminant)),
            _ => None,
        }
    }

    /// Whether two values are equal under [`Value::compare`].
    #[inline]
    pub fn equals(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// The textual form used by substring operators.
    ///
    /// Returns `None` for null.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(v) => Cow::Owned(v.to_string()),
            Self::Int(v) => Cow::Owned(v.to_string()),
            Self::UInt(v) => Cow::Owned(v.to_string()),
            Self::Float(v) => Cow::Owned(v.to_string()),
            Self::Decimal(v) => Cow::Owned(v.normalize().to_string()),
            Self::String(v) => Cow::Borrowed(v.as_str()),
            Self::Char(v) => Cow::Owned(v.to_string()),
            Self::Date(v) => Cow::Owned(v.format("%Y-%m-%d").to_string()),
            Self::DateTime(v) => Cow::Owned(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::DateTimeOffset(v) => Cow::Owned(v.to_rfc3339()),
            Self::Time(v) => Cow::Owned(v.format("%H:%M:%S%.f").to_string()),
            Self::Uuid(v) => Cow::Owned(v.hyphenated().to_string()),
            Self::Enum(v) => Cow::Borrowed(v.name),
        })
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(v) => Some(Decimal::from(*v)),
            Self::UInt(v) => Some(Decimal::from(*v)),
            Self::Float(v) => Decimal::from_f64(*v),
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::String(v) => write!(f, "{:?}", v),
            Self::Char(v) => write!(f, "{:?}", v),
            other => match other.to_text() {
                Some(text) => f.write_str(&text),
                None => f.write_str("NULL"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COLORS: EnumDescriptor = EnumDescriptor {
        name: "Color",
        variants: &[("Red", 1), ("Green", 2)],
    };

    #[test]
    fn test_numeric_cross_compare() {
        assert_eq!(Value::Int(-1).compare(&Value::UInt(1)), Some(Ordering::Less));
        assert_eq!(Value::Int(2).compare(&Value::Float(2.0)), Some(Ordering::Equal));
        assert!(Value::Decimal(Decimal::new(15, 1)).equals(&Value::Float(1.5)));
    }

    #[test]
    fn test_null_never_compares() {
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_eq!(Value::Int(1).compare(&Value::Null), None);
        assert!(Value::Null.to_text().is_none());
    }

    #[test]
    fn test_text_forms() {
        let uuid = Uuid::parse_str("6F9619FF-8B86-D011-B42D-00CF4FC964FF").unwrap();
        assert_eq!(
            Value::Uuid(uuid).to_text().unwrap(),
            "6f9619ff-8b86-d011-b42d-00cf4fc964ff"
        );
        assert_eq!(Value::Decimal(Decimal::new(1500, 3)).to_text().unwrap(), "1.5");
        let red = COLORS.by_name("red", false).unwrap();
        assert_eq!(Value::Enum(red).to_text().unwrap(), "Red");
    }

    #[test]
    fn test_enum_lookup() {
        assert!(COLORS.by_name("red", true).is_none());
        assert_eq!(COLORS.by_discriminant(2).map(|v| v.name), Some("Green"));
        assert!(COLORS.by_discriminant(3).is_none());
    }

    #[test]
    fn test_field_type_accepts() {
        let required = FieldType::required(ScalarType::I32);
        let nullable = FieldType::nullable(ScalarType::I32);
        assert!(nullable.accepts(&required));
        assert!(!required.accepts(&nullable));
        assert!(!required.accepts(&FieldType::required(ScalarType::I64)));
        assert_eq!(nullable.to_string(), "Option<i32>");
    }
}
