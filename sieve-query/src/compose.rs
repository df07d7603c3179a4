//! Compilation of entity filters into predicates.
//!
//! The composer walks the entity's schema in declaration order:
//!
//! - scalar properties go through the interceptor, then the creator
//!   registered for their type;
//! - nested objects become [`Expr::Member`], nested collections
//!   [`Expr::Any`], optionally guarded by `IS NOT NULL`;
//! - everything is AND-combined. A filter that produces nothing compiles to
//!   `None`, which matches every entity.
//!
//! Compilation never mutates the filter; compiling twice yields equal
//! expressions.
//!
//! ```rust
//! use sieve_query::{entity_filter, filterable, FilterContext};
//!
//! pub struct Person {
//!     pub name: String,
//! }
//!
//! filterable! {
//!     Person {
//!         name: String,
//!     }
//! }
//!
//! let filter = entity_filter!(Person { name: "jo" }).unwrap();
//! let predicate = filter.predicate(&FilterContext::default()).unwrap().unwrap();
//! assert!(predicate.matches(&Person { name: "John".into() }));
//! assert!(!predicate.matches(&Person { name: "Bob".into() }));
//! assert_eq!(predicate.to_string(), r#"icontains(name, "jo")"#);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::{FilterConfiguration, NullSafety};
use crate::creators::CreatorRegistry;
use crate::entity::{EntityFilter, EntityFilterData};
use crate::error::{FilterError, FilterResult};
use crate::expr::Expr;
use crate::interceptor::FilterInterceptor;
use crate::operator::FilterOperator;
use crate::schema::{EntitySchema, Filterable, PropertyDescriptor, PropertyKind};
use crate::value::FieldType;
use crate::value_filter::ValueFilter;

/// Everything compilation depends on besides the filter itself.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone, Default)]
pub struct FilterContext {
    configuration: FilterConfiguration,
    creators: Arc<CreatorRegistry>,
    interceptor: Option<Arc<dyn FilterInterceptor>>,
}

impl FilterContext {
    /// Create a context with the given configuration and built-in creators.
    pub fn new(configuration: FilterConfiguration) -> Self {
        Self {
            configuration,
            ..Self::default()
        }
    }

    /// Set the configuration.
    pub fn with_configuration(mut self, configuration: FilterConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set the creator registry.
    pub fn with_creators(mut self, creators: CreatorRegistry) -> Self {
        self.creators = Arc::new(creators);
        self
    }

    /// Set the interceptor.
    pub fn with_interceptor<I: FilterInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    /// The configuration used when a filter carries none.
    pub fn configuration(&self) -> &FilterConfiguration {
        &self.configuration
    }

    /// The creator registry.
    pub fn creators(&self) -> &CreatorRegistry {
        &self.creators
    }

    /// The interceptor, if any.
    pub fn interceptor(&self) -> Option<&dyn FilterInterceptor> {
        self.interceptor.as_deref()
    }
}

impl fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("configuration", &self.configuration)
            .field("creators", &self.creators)
            .field("interceptor", &self.interceptor.as_ref().map(|i| i.name()))
            .finish()
    }
}

/// A compiled predicate over entities of type `T`.
pub struct Predicate<T> {
    expr: Expr,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T: Filterable> Predicate<T> {
    /// Wrap an expression.
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    /// Evaluate against an entity.
    #[inline]
    pub fn matches(&self, entity: &T) -> bool {
        self.expr.matches(entity)
    }
}

impl<T> Predicate<T> {
    /// The underlying expression.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consume the predicate, returning its expression.
    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> PartialEq for Predicate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

/// Who consumes the compiled expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Evaluated in memory through [`Expr::matches`].
    InMemory,
    /// Handed to a deferred translator.
    Deferred,
}

impl<T: Filterable> EntityFilter<T> {
    /// Compile into a predicate for in-memory evaluation.
    ///
    /// Returns `None` when the filter produces no predicate at all.
    pub fn predicate(&self, ctx: &FilterContext) -> FilterResult<Option<Predicate<T>>> {
        Ok(self.compile(ctx, Target::InMemory)?.map(Predicate::new))
    }

    /// Compile into an expression for a deferred query translator.
    ///
    /// Under [`NullSafety::Auto`] nested accesses are not null-guarded.
    pub fn deferred_expr(&self, ctx: &FilterContext) -> FilterResult<Option<Expr>> {
        self.compile(ctx, Target::Deferred)
    }

    /// Filter entities in memory.
    ///
    /// A filter without predicate passes every item.
    pub fn apply<I>(
        &self,
        ctx: &FilterContext,
        items: I,
    ) -> FilterResult<impl Iterator<Item = I::Item>>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let predicate = self.predicate(ctx)?;
        Ok(items.into_iter().filter(move |item| {
            predicate
                .as_ref()
                .is_none_or(|p| p.matches(<I::Item as Borrow<T>>::borrow(item)))
        }))
    }

    fn compile(&self, ctx: &FilterContext, target: Target) -> FilterResult<Option<Expr>> {
        let config = self.configuration().unwrap_or(ctx.configuration());
        let composer = Composer {
            ctx,
            config,
            target,
        };
        composer.entity(T::schema(), self.data())
    }
}

struct Composer<'a> {
    ctx: &'a FilterContext,
    config: &'a FilterConfiguration,
    target: Target,
}

impl Composer<'_> {
    fn entity(
        &self,
        schema: &'static EntitySchema,
        data: &EntityFilterData,
    ) -> FilterResult<Option<Expr>> {
        for unknown in data
            .property_filters
            .iter()
            .map(|p| &p.property_name)
            .chain(data.nested_filters.iter().map(|n| &n.property_name))
            .filter(|name| schema.property(name).is_none())
        {
            debug!(entity = schema.name, property = %unknown, "skipping filter on unknown property");
        }

        let mut parts = Vec::new();
        for descriptor in schema.properties {
            match descriptor.kind {
                PropertyKind::Scalar(field_type) => {
                    let filters: Vec<ValueFilter> =
                        data.values_for(descriptor.name).cloned().collect();
                    if filters.is_empty() {
                        continue;
                    }
                    if let Some(expr) = self.property(schema, descriptor, field_type, &filters)? {
                        debug!(
                            entity = schema.name,
                            property = descriptor.name,
                            predicate = %expr,
                            "compiled property filter"
                        );
                        parts.push(expr);
                    }
                }
                PropertyKind::Nested { collection, schema: nested } => {
                    for nested_data in data.nested_for(descriptor.name) {
                        let Some(inner) = self.entity(nested(), nested_data)? else {
                            continue;
                        };
                        let wrapped = if collection {
                            Expr::any(descriptor.name, inner)
                        } else {
                            Expr::member(descriptor.name, inner)
                        };
                        parts.push(self.guard(descriptor.name, wrapped));
                    }
                }
            }
        }
        Ok(Expr::and(parts))
    }

    /// Apply the null-safety policy to a nested access.
    fn guard(&self, property: &'static str, access: Expr) -> Expr {
        let guarded = match self.config.null_safety {
            NullSafety::Always => true,
            NullSafety::Never => false,
            NullSafety::Auto => self.target == Target::InMemory,
        };
        if guarded {
            Expr::And(vec![Expr::is_not_null(property), access])
        } else {
            access
        }
    }

    fn property(
        &self,
        schema: &'static EntitySchema,
        descriptor: &'static PropertyDescriptor,
        field_type: FieldType,
        filters: &[ValueFilter],
    ) -> FilterResult<Option<Expr>> {
        if let Some(interceptor) = self.ctx.interceptor() {
            if let Some(result) = interceptor.intercept(schema, descriptor, filters, self.config) {
                debug!(
                    entity = schema.name,
                    property = descriptor.name,
                    interceptor = interceptor.name(),
                    "property intercepted"
                );
                return result
                    .map(Some)
                    .map_err(|e| e.in_property(schema.name, descriptor.name));
            }
        }

        let creator = self.ctx.creators().resolve(&field_type.scalar);
        let supported = creator.supported_operators(&field_type);
        let mut any_of = Vec::new();
        let mut all_of = Vec::new();

        for filter in filters {
            let operator = filter.operator();
            if !supported.contains(&operator) {
                return Err(FilterError::unsupported_operator(
                    schema.name,
                    descriptor.name,
                    field_type.to_string(),
                    operator,
                    &supported,
                ));
            }

            let expr = match operator {
                FilterOperator::IsNull => Expr::is_null(descriptor.name),
                FilterOperator::NotNull => Expr::is_not_null(descriptor.name),
                _ => {
                    let raw = filter.value().unwrap_or_default();
                    let compiled = creator
                        .parse(operator, raw, &field_type, self.config)
                        .and_then(|operand| {
                            creator.compile(operator, operand, descriptor.name, &field_type)
                        });
                    match compiled {
                        Ok(expr) => expr,
                        Err(err) if err.is_value_error() && self.config.ignore_parse_errors => {
                            warn!(
                                entity = schema.name,
                                property = descriptor.name,
                                value = raw,
                                error = %err,
                                "ignoring unparsable filter value"
                            );
                            continue;
                        }
                        Err(err) => return Err(err.in_property(schema.name, descriptor.name)),
                    }
                }
            };

            trace!(
                property = descriptor.name,
                operator = %operator,
                creator = creator.name(),
                "compiled value filter"
            );
            if operator == FilterOperator::NotEqual {
                all_of.push(expr);
            } else {
                any_of.push(expr);
            }
        }

        Ok(Expr::and(Expr::or(any_of).into_iter().chain(all_of)))
    }
}
