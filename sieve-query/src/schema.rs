//! Entity registration: static schemas and typed property accessors.
//!
//! Entities are registered with the [`filterable!`](crate::filterable) macro,
//! which generates a [`Record`] implementation (property access by name) and a
//! [`Filterable`] implementation (the static [`EntitySchema`]).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::value::{FieldType, ScalarType, Value};

/// Dynamic, object-safe access to an entity's properties.
pub trait Record {
    /// Value of a scalar property; `Value::Null` when absent.
    fn value(&self, property: &str) -> Value;

    /// Nested object or collection behind a property.
    fn nested(&self, property: &str) -> Nested<'_>;

    /// Whether the property holds no value.
    fn is_null(&self, property: &str) -> bool {
        match self.nested(property) {
            Nested::Null => true,
            Nested::One(_) | Nested::Many(_) => false,
            Nested::Absent => self.value(property).is_null(),
        }
    }
}

/// A nested property value.
pub enum Nested<'a> {
    /// The property is not a nested property.
    Absent,
    /// The nested object or collection is missing.
    Null,
    /// A single nested object.
    One(&'a dyn Record),
    /// A nested collection.
    Many(Vec<&'a dyn Record>),
}

/// An entity type with a static schema.
pub trait Filterable: Record + Sized + 'static {
    /// The entity's filterable properties.
    fn schema() -> &'static EntitySchema;
}

/// Static description of an entity type.
#[derive(Debug)]
pub struct EntitySchema {
    /// Entity name.
    pub name: &'static str,
    /// Properties in declaration order.
    pub properties: &'static [PropertyDescriptor],
}

impl EntitySchema {
    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A single filterable property.
#[derive(Debug)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: &'static str,
    /// Scalar or nested.
    pub kind: PropertyKind,
}

/// What a property holds.
#[derive(Debug, Clone, Copy)]
pub enum PropertyKind {
    /// A scalar value.
    Scalar(FieldType),
    /// A nested entity or a collection of nested entities.
    Nested {
        /// Whether the property is a collection.
        collection: bool,
        /// Schema of the nested entity.
        schema: fn() -> &'static EntitySchema,
    },
}

impl PropertyDescriptor {
    /// Describe a scalar property.
    pub const fn scalar(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            kind: PropertyKind::Scalar(field_type),
        }
    }

    /// Describe a nested property.
    pub const fn nested(
        name: &'static str,
        collection: bool,
        schema: fn() -> &'static EntitySchema,
    ) -> Self {
        Self {
            name,
            kind: PropertyKind::Nested { collection, schema },
        }
    }

    /// The field type of a scalar property.
    pub fn field_type(&self) -> Option<FieldType> {
        match self.kind {
            PropertyKind::Scalar(field_type) => Some(field_type),
            PropertyKind::Nested { .. } => None,
        }
    }

    /// The nested schema and collection flag of a nested property.
    pub fn nested_schema(&self) -> Option<(&'static EntitySchema, bool)> {
        match self.kind {
            PropertyKind::Nested { collection, schema } => Some((schema(), collection)),
            PropertyKind::Scalar(_) => None,
        }
    }
}

/// A Rust type usable as a scalar filter property.
pub trait FilterField {
    /// Declared type.
    const FIELD_TYPE: FieldType;

    /// Convert to a runtime value.
    fn to_value(&self) -> Value;
}

macro_rules! impl_filter_field {
    ($($ty:ty => $scalar:ident, |$v:ident| $conv:expr;)*) => {
        $(
            impl FilterField for $ty {
                const FIELD_TYPE: FieldType = FieldType::required(ScalarType::$scalar);

                #[inline]
                fn to_value(&self) -> Value {
                    let $v = self;
                    $conv
                }
            }
        )*
    };
}

impl_filter_field! {
    bool => Bool, |v| Value::Bool(*v);
    i8 => I8, |v| Value::Int(i64::from(*v));
    i16 => I16, |v| Value::Int(i64::from(*v));
    i32 => I32, |v| Value::Int(i64::from(*v));
    i64 => I64, |v| Value::Int(*v);
    u8 => U8, |v| Value::UInt(u64::from(*v));
    u16 => U16, |v| Value::UInt(u64::from(*v));
    u32 => U32, |v| Value::UInt(u64::from(*v));
    u64 => U64, |v| Value::UInt(*v);
    f32 => F32, |v| Value::Float(f64::from(*v));
    f64 => F64, |v| Value::Float(*v);
    Decimal => Decimal, |v| Value::Decimal(*v);
    String => String, |v| Value::String(v.clone());
    char => Char, |v| Value::Char(*v);
    NaiveDate => Date, |v| Value::Date(*v);
    NaiveDateTime => DateTime, |v| Value::DateTime(*v);
    DateTime<FixedOffset> => DateTimeOffset, |v| Value::DateTimeOffset(*v);
    DateTime<Utc> => DateTimeOffset, |v| Value::DateTimeOffset(v.fixed_offset());
    NaiveTime => Time, |v| Value::Time(*v);
    Uuid => Uuid, |v| Value::Uuid(*v);
}

impl<T: FilterField> FilterField for Option<T> {
    const FIELD_TYPE: FieldType = FieldType::nullable(T::FIELD_TYPE.scalar);

    #[inline]
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

/// A Rust type usable as a nested filter property.
pub trait NestedValue {
    /// The nested entity type.
    type Entity: Filterable;

    /// Whether the property is a collection of entities.
    const COLLECTION: bool;

    /// Borrow the nested value.
    fn as_nested(&self) -> Nested<'_>;
}

impl<T: NestedValue> NestedValue for Option<T> {
    type Entity = T::Entity;
    const COLLECTION: bool = T::COLLECTION;

    fn as_nested(&self) -> Nested<'_> {
        match self {
            Some(v) => v.as_nested(),
            None => Nested::Null,
        }
    }
}

impl<T: NestedValue> NestedValue for Box<T> {
    type Entity = T::Entity;
    const COLLECTION: bool = T::COLLECTION;

    fn as_nested(&self) -> Nested<'_> {
        (**self).as_nested()
    }
}

impl<T: Filterable> NestedValue for Vec<T> {
    type Entity = T;
    const COLLECTION: bool = true;

    fn as_nested(&self) -> Nested<'_> {
        Nested::Many(self.iter().map(|item| item as &dyn Record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filterable;

    struct Tag {
        label: String,
    }

    struct Post {
        title: String,
        views: Option<u32>,
        tags: Vec<Tag>,
        parent: Option<Box<Post>>,
    }

    filterable! {
        Tag {
            label: String,
        }
    }

    filterable! {
        Post {
            title: String,
            views: Option<u32>,
        }
        nested {
            tags: Vec<Tag>,
            parent: Option<Box<Post>>,
        }
    }

    fn post() -> Post {
        Post {
            title: "Hello".into(),
            views: None,
            tags: vec![Tag { label: "rust".into() }],
            parent: None,
        }
    }

    #[test]
    fn test_schema_declaration_order() {
        let schema = Post::schema();
        assert_eq!(schema.name, "Post");
        let names: Vec<_> = schema.properties.iter().map(|p| p.name).collect();
        assert_eq!(names, ["title", "views", "tags", "parent"]);
        assert_eq!(
            schema.property("views").and_then(|p| p.field_type()),
            Some(FieldType::nullable(ScalarType::U32))
        );
    }

    #[test]
    fn test_nested_descriptors() {
        let schema = Post::schema();
        let (tags, collection) = schema.property("tags").unwrap().nested_schema().unwrap();
        assert_eq!(tags.name, "Tag");
        assert!(collection);
        let (parent, collection) = schema.property("parent").unwrap().nested_schema().unwrap();
        assert_eq!(parent.name, "Post");
        assert!(!collection);
    }

    #[test]
    fn test_record_access() {
        let post = post();
        assert_eq!(post.value("title"), Value::String("Hello".into()));
        assert!(post.is_null("views"));
        assert!(post.is_null("parent"));
        assert!(!post.is_null("tags"));
        assert!(matches!(post.nested("title"), Nested::Absent));
        match post.nested("tags") {
            Nested::Many(items) => assert_eq!(items[0].value("label"), Value::String("rust".into())),
            _ => panic!("expected collection"),
        }
    }
}
