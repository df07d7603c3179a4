//! Registration and construction macros.
//!
//! # Examples
//!
//! ```rust
//! use sieve_query::{entity_filter, filter_enum, filterable, FilterContext};
//!
//! filter_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq)]
//!     pub enum Role {
//!         Admin = 1,
//!         Member = 2,
//!     }
//! }
//!
//! pub struct User {
//!     pub name: String,
//!     pub role: Role,
//! }
//!
//! filterable! {
//!     User {
//!         name: String,
//!         role: Role,
//!     }
//! }
//!
//! let filter = entity_filter!(User { name: "~an", role: "admin" }).unwrap();
//! let users = vec![
//!     User { name: "Dana".into(), role: Role::Admin },
//!     User { name: "Dan".into(), role: Role::Member },
//! ];
//! let ctx = FilterContext::default();
//! let matched: Vec<_> = filter.apply(&ctx, users.iter()).unwrap().collect();
//! assert_eq!(matched.len(), 1);
//! ```

/// Register a struct as a filterable entity.
///
/// Scalar properties are listed first; nested objects and collections follow
/// in an optional `nested` block. Each listed type must match the struct
/// field's type.
///
/// # Syntax
///
/// ```rust,ignore
/// filterable! {
///     Person {
///         name: String,
///         age: Option<i32>,
///     }
///     nested {
///         address: Option<Address>,
///         pets: Vec<Pet>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! filterable {
    (
        $entity:ident {
            $($field:ident : $ty:ty),* $(,)?
        }
        $(nested {
            $($nested:ident : $nty:ty),* $(,)?
        })?
    ) => {
        impl $crate::schema::Record for $entity {
            #[allow(unused_variables)]
            fn value(&self, property: &str) -> $crate::value::Value {
                $(
                    if property == stringify!($field) {
                        return <$ty as $crate::schema::FilterField>::to_value(&self.$field);
                    }
                )*
                $crate::value::Value::Null
            }

            #[allow(unused_variables)]
            fn nested(&self, property: &str) -> $crate::schema::Nested<'_> {
                $($(
                    if property == stringify!($nested) {
                        return <$nty as $crate::schema::NestedValue>::as_nested(&self.$nested);
                    }
                )*)?
                $crate::schema::Nested::Absent
            }
        }

        impl $crate::schema::Filterable for $entity {
            fn schema() -> &'static $crate::schema::EntitySchema {
                static SCHEMA: $crate::schema::EntitySchema = $crate::schema::EntitySchema {
                    name: stringify!($entity),
                    properties: &[
                        $(
                            $crate::schema::PropertyDescriptor::scalar(
                                stringify!($field),
                                <$ty as $crate::schema::FilterField>::FIELD_TYPE,
                            ),
                        )*
                        $($(
                            $crate::schema::PropertyDescriptor::nested(
                                stringify!($nested),
                                <$nty as $crate::schema::NestedValue>::COLLECTION,
                                <<$nty as $crate::schema::NestedValue>::Entity as $crate::schema::Filterable>::schema,
                            ),
                        )*)?
                    ],
                };
                &SCHEMA
            }
        }

        impl $crate::schema::NestedValue for $entity {
            type Entity = $entity;
            const COLLECTION: bool = false;

            fn as_nested(&self) -> $crate::schema::Nested<'_> {
                $crate::schema::Nested::One(self)
            }
        }
    };
}

/// Declare a fieldless enum and register it as a filterable scalar.
///
/// Every variant needs an explicit discriminant.
#[macro_export]
macro_rules! filter_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $disc:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant = $disc),+
        }

        impl $name {
            /// Static descriptor used by the filter engine.
            pub const DESCRIPTOR: &'static $crate::value::EnumDescriptor =
                &$crate::value::EnumDescriptor {
                    name: stringify!($name),
                    variants: &[$((stringify!($variant), $disc as i64)),+],
                };
        }

        impl $crate::schema::FilterField for $name {
            const FIELD_TYPE: $crate::value::FieldType = $crate::value::FieldType::required(
                $crate::value::ScalarType::Enum($name::DESCRIPTOR),
            );

            fn to_value(&self) -> $crate::value::Value {
                let (name, discriminant) = match self {
                    $(Self::$variant => (stringify!($variant), $disc as i64)),+
                };
                $crate::value::Value::Enum($crate::value::EnumValue { name, discriminant })
            }
        }
    };
}

/// Build an [`EntityFilter`](crate::EntityFilter) from micro-syntax strings.
///
/// Evaluates to `FilterResult<EntityFilter<T>>`.
///
/// ```rust,ignore
/// let filter = entity_filter!(Person { name: "~jo", age: ">=18" })?;
/// ```
#[macro_export]
macro_rules! entity_filter {
    ($entity:ty { $($property:ident : $syntax:expr),* $(,)? }) => {{
        (|| -> $crate::error::FilterResult<$crate::entity::EntityFilter<$entity>> {
            #[allow(unused_mut)]
            let mut filter = $crate::entity::EntityFilter::<$entity>::new();
            $(
                filter.add_syntax(stringify!($property), $syntax)?;
            )*
            Ok(filter)
        })()
    }};
}
