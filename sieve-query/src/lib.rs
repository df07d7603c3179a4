//! # sieve-query
//!
//! Typed entity filters driven by a compact micro-syntax.
//!
//! This crate provides:
//! - A micro-syntax for filter values (`">18,<65"`, `"~smith"`, `"ISNULL"`)
//! - Registration of entity types and enums with `filterable!` / `filter_enum!`
//! - Per-type expression creators, replaceable through a [`CreatorRegistry`]
//! - Composition of property, nested object and nested collection filters
//! - An interceptor hook for taking over single properties
//! - Locale-aware number and date parsing with natural-language dates
//! - Serde and query-string wire formats
//!
//! ## Registering entities
//!
//! ```rust
//! use sieve_query::{filter_enum, filterable};
//!
//! filter_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq)]
//!     pub enum Status {
//!         Active = 1,
//!         Retired = 2,
//!     }
//! }
//!
//! pub struct Address {
//!     pub city: String,
//! }
//!
//! pub struct Employee {
//!     pub name: String,
//!     pub age: Option<i32>,
//!     pub status: Status,
//!     pub address: Option<Address>,
//! }
//!
//! filterable! {
//!     Address {
//!         city: String,
//!     }
//! }
//!
//! filterable! {
//!     Employee {
//!         name: String,
//!         age: Option<i32>,
//!         status: Status,
//!     }
//!     nested {
//!         address: Option<Address>,
//!     }
//! }
//! ```
//!
//! ## Building and applying filters
//!
//! ```rust
//! # use sieve_query::{filter_enum, filterable};
//! # filter_enum! {
//! #     #[derive(Debug, Clone, Copy, PartialEq)]
//! #     pub enum Status { Active = 1, Retired = 2 }
//! # }
//! # pub struct Employee { pub name: String, pub age: Option<i32>, pub status: Status }
//! # filterable! { Employee { name: String, age: Option<i32>, status: Status } }
//! use sieve_query::{EntityFilter, FilterContext};
//!
//! let mut filter = EntityFilter::<Employee>::new();
//! filter.add_syntax("age", ">=18,ISNULL").unwrap();
//! filter.add_syntax("status", "active").unwrap();
//!
//! let ctx = FilterContext::default();
//! let predicate = filter.predicate(&ctx).unwrap().unwrap();
//! assert!(predicate.matches(&Employee {
//!     name: "Ann".into(),
//!     age: None,
//!     status: Status::Active,
//! }));
//! assert!(!predicate.matches(&Employee {
//!     name: "Bob".into(),
//!     age: Some(12),
//!     status: Status::Active,
//! }));
//! ```
//!
//! ## Deferred translation
//!
//! [`EntityFilter::deferred_expr`] returns the compiled [`Expr`] for a query
//! translator instead of an in-memory predicate. Its `Display` form reads
//! like a boolean expression:
//!
//! ```rust
//! # use sieve_query::filterable;
//! # pub struct Employee { pub name: String }
//! # filterable! { Employee { name: String } }
//! use sieve_query::{EntityFilter, FilterContext};
//!
//! let mut filter = EntityFilter::<Employee>::new();
//! filter.add_syntax("name", "^an,!anton").unwrap();
//! let expr = filter.deferred_expr(&FilterContext::default()).unwrap().unwrap();
//! assert_eq!(
//!     expr.to_string(),
//!     r#"(istarts_with(name, "an") AND NOT icontains(name, "anton"))"#
//! );
//! ```

pub mod compose;
pub mod config;
pub mod creators;
pub mod datetime;
pub mod entity;
pub mod error;
pub mod expr;
pub mod interceptor;
pub mod locale;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod operator;
pub mod query_string;
pub mod schema;
pub mod syntax;
pub mod value;
pub mod value_filter;

pub use compose::{FilterContext, Predicate};
pub use config::{Clock, FilterConfiguration, FilterOverride, NullSafety, SieveConfig};
pub use creators::{CreatorRegistry, ExpressionCreator, Operand, SharedCreator};
pub use entity::{EntityFilter, EntityFilterData, NestedFilter, PropertyFilter};
pub use error::{FilterError, FilterResult};
pub use expr::{CompareOp, Expr, FieldName, TextOp};
pub use interceptor::FilterInterceptor;
pub use locale::{DateOrder, Locale};
pub use operator::{FilterOperator, OperatorTable};
pub use query_string::PropertyNaming;
pub use schema::{
    EntitySchema, FilterField, Filterable, Nested, NestedValue, PropertyDescriptor, PropertyKind,
    Record,
};
pub use value::{EnumDescriptor, EnumValue, FieldType, ScalarType, Value};
pub use value_filter::ValueFilter;

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compose::{FilterContext, Predicate};
    pub use crate::config::{FilterConfiguration, NullSafety};
    pub use crate::entity::EntityFilter;
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::expr::Expr;
    pub use crate::interceptor::FilterInterceptor;
    pub use crate::operator::FilterOperator;
    pub use crate::query_string::PropertyNaming;
    pub use crate::schema::{Filterable, Record};
    pub use crate::value_filter::ValueFilter;
    pub use crate::{entity_filter, filter_enum, filterable};
}
