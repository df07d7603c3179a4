//! Per-property interception of predicate compilation.
//!
//! An interceptor sees every scalar property before its value filters are
//! handed to a creator. Returning `Some` replaces the predicate for that
//! property only; `None` keeps the default path.
//!
//! ```rust
//! use sieve_query::expr::{Expr, TextOp};
//! use sieve_query::{
//!     entity_filter, filterable, EntitySchema, FilterConfiguration, FilterContext,
//!     FilterInterceptor, FilterResult, PropertyDescriptor, ValueFilter,
//! };
//!
//! pub struct Account {
//!     pub email: String,
//! }
//!
//! filterable! {
//!     Account {
//!         email: String,
//!     }
//! }
//!
//! /// Filters emails by domain instead of by substring.
//! struct EmailDomain;
//!
//! impl FilterInterceptor for EmailDomain {
//!     fn intercept(
//!         &self,
//!         _entity: &'static EntitySchema,
//!         property: &'static PropertyDescriptor,
//!         filters: &[ValueFilter],
//!         _configuration: &FilterConfiguration,
//!     ) -> Option<FilterResult<Expr>> {
//!         if property.name != "email" {
//!             return None;
//!         }
//!         let domains = filters
//!             .iter()
//!             .filter_map(|f| f.value())
//!             .map(|domain| Expr::text("email", TextOp::EndsWith, format!("@{domain}"), false));
//!         Expr::or(domains).map(Ok)
//!     }
//! }
//!
//! let ctx = FilterContext::default().with_interceptor(EmailDomain);
//! let filter = entity_filter!(Account { email: "example.com" }).unwrap();
//! let predicate = filter.predicate(&ctx).unwrap().unwrap();
//! assert!(predicate.matches(&Account { email: "a@example.com".into() }));
//! assert!(!predicate.matches(&Account { email: "a@example.com.evil".into() }));
//! ```

use crate::config::FilterConfiguration;
use crate::error::FilterResult;
use crate::expr::Expr;
use crate::schema::{EntitySchema, PropertyDescriptor};
use crate::value_filter::ValueFilter;

/// Hook consulted before default compilation of each scalar property.
pub trait FilterInterceptor: Send + Sync {
    /// Produce a replacement predicate for `property`, or `None` to fall
    /// through to the registered creators.
    fn intercept(
        &self,
        entity: &'static EntitySchema,
        property: &'static PropertyDescriptor,
        filters: &[ValueFilter],
        configuration: &FilterConfiguration,
    ) -> Option<FilterResult<Expr>>;

    /// Name of this interceptor (for debugging/logging).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> FilterInterceptor for F
where
    F: Fn(
            &'static EntitySchema,
            &'static PropertyDescriptor,
            &[ValueFilter],
            &FilterConfiguration,
        ) -> Option<FilterResult<Expr>>
        + Send
        + Sync,
{
    fn intercept(
        &self,
        entity: &'static EntitySchema,
        property: &'static PropertyDescriptor,
        filters: &[ValueFilter],
        configuration: &FilterConfiguration,
    ) -> Option<FilterResult<Expr>> {
        self(entity, property, filters, configuration)
    }
}
