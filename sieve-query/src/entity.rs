//! Entity filters: value filters per property plus nested filters.
//!
//! An [`EntityFilter<T>`] is a mutable builder. Every mutation checks the
//! property against `T`'s schema, so typos surface where the filter is built
//! rather than where it is compiled.
//!
//! ```rust
//! use sieve_query::{filterable, EntityFilter, FilterOperator, ValueFilter};
//!
//! pub struct Person {
//!     pub name: String,
//!     pub age: Option<i32>,
//! }
//!
//! filterable! {
//!     Person {
//!         name: String,
//!         age: Option<i32>,
//!     }
//! }
//!
//! let mut filter = EntityFilter::<Person>::new();
//! filter
//!     .add_syntax("name", "~jo,^Ann")?
//!     .add_values("age", FilterOperator::GreaterThanOrEqual, [Some(18)])?
//!     .add("age", ValueFilter::is_null())?;
//!
//! assert_eq!(filter.property_filters("name").map(|f| f.len()), Some(2));
//! assert!(filter.add_syntax("address.city", "NYC").is_err());
//! # Ok::<(), sieve_query::FilterError>(())
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

use crate::config::FilterConfiguration;
use crate::error::{FilterError, FilterResult};
use crate::operator::{FilterOperator, OperatorTable};
use crate::schema::{EntitySchema, FilterField, Filterable, PropertyDescriptor, PropertyKind};
use crate::syntax;
use crate::value_filter::ValueFilter;

/// Value filters for one scalar property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    /// Property name.
    pub property_name: String,
    /// Value filters, combined as described on [`EntityFilter`].
    pub value_filters: Vec<ValueFilter>,
}

/// Filter on a nested object or collection property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedFilter {
    /// Property name.
    pub property_name: String,
    /// Filter for the nested entity type.
    pub entity_filter: EntityFilterData,
}

/// The untyped content of an entity filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilterData {
    /// Scalar property filters in insertion order.
    #[serde(default)]
    pub property_filters: Vec<PropertyFilter>,
    /// Nested filters in insertion order.
    #[serde(default)]
    pub nested_filters: Vec<NestedFilter>,
}

impl EntityFilterData {
    /// Whether no filters are present.
    pub fn is_empty(&self) -> bool {
        self.property_filters.is_empty() && self.nested_filters.is_empty()
    }

    /// All value filters recorded for `property`.
    pub(crate) fn values_for<'a>(
        &'a self,
        property: &'a str,
    ) -> impl Iterator<Item = &'a ValueFilter> {
        self.property_filters
            .iter()
            .filter(move |p| p.property_name == property)
            .flat_map(|p| p.value_filters.iter())
    }

    /// Nested filters recorded for `property`.
    pub(crate) fn nested_for<'a>(
        &'a self,
        property: &'a str,
    ) -> impl Iterator<Item = &'a EntityFilterData> {
        self.nested_filters
            .iter()
            .filter(move |n| n.property_name == property)
            .map(|n| &n.entity_filter)
    }

    pub(crate) fn push_values(
        &mut self,
        property: &str,
        filters: impl IntoIterator<Item = ValueFilter>,
    ) {
        match self
            .property_filters
            .iter_mut()
            .find(|p| p.property_name == property)
        {
            Some(existing) => existing.value_filters.extend(filters),
            None => self.property_filters.push(PropertyFilter {
                property_name: property.to_string(),
                value_filters: filters.into_iter().collect(),
            }),
        }
    }

    /// The nested filter data for `property`, created when missing.
    pub(crate) fn nested_mut(&mut self, property: &str) -> &mut EntityFilterData {
        let idx = match self
            .nested_filters
            .iter()
            .position(|n| n.property_name == property)
        {
            Some(idx) => idx,
            None => {
                self.nested_filters.push(NestedFilter {
                    property_name: property.to_string(),
                    entity_filter: EntityFilterData::default(),
                });
                self.nested_filters.len() - 1
            }
        };
        &mut self.nested_filters[idx].entity_filter
    }

    /// Keep the filters that are valid on `to`, converting from `from`.
    fn cast(&self, from: &EntitySchema, to: &EntitySchema) -> Self {
        let property_filters = self
            .property_filters
            .iter()
            .filter(|filter| {
                let source = from.property(&filter.property_name).and_then(|p| p.field_type());
                let target = to.property(&filter.property_name).and_then(|p| p.field_type());
                matches!((source, target), (Some(s), Some(t)) if t.accepts(&s))
            })
            .cloned()
            .collect();

        let nested_filters = self
            .nested_filters
            .iter()
            .filter_map(|nested| {
                let (source, source_many) = from.property(&nested.property_name)?.nested_schema()?;
                let (target, target_many) = to.property(&nested.property_name)?.nested_schema()?;
                (source_many == target_many).then(|| NestedFilter {
                    property_name: nested.property_name.clone(),
                    entity_filter: nested.entity_filter.cast(source, target),
                })
            })
            .collect();

        Self {
            property_filters,
            nested_filters,
        }
    }
}

/// A filter over entities of type `T`.
///
/// Scalar properties take any number of [`ValueFilter`]s. Values on one
/// property are OR-combined, except `NotEqual` values, which are AND-combined
/// with each other and with the rest (`!a,!b` excludes both). Properties and
/// nested filters are AND-combined in schema declaration order.
pub struct EntityFilter<T> {
    data: EntityFilterData,
    configuration: Option<FilterConfiguration>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntityFilter<T> {
    /// Wrap untyped data without validation.
    ///
    /// Unknown property names are skipped when the filter is compiled.
    pub fn from_data(data: EntityFilterData) -> Self {
        Self {
            data,
            configuration: None,
            _entity: PhantomData,
        }
    }

    /// The untyped filter content.
    pub fn data(&self) -> &EntityFilterData {
        &self.data
    }

    /// Consume the filter, returning its untyped content.
    pub fn into_data(self) -> EntityFilterData {
        self.data
    }

    /// Attach a configuration that wins over the context's.
    pub fn with_configuration(mut self, configuration: FilterConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Set or clear the per-filter configuration.
    pub fn set_configuration(&mut self, configuration: Option<FilterConfiguration>) -> &mut Self {
        self.configuration = configuration;
        self
    }

    /// The per-filter configuration.
    pub fn configuration(&self) -> Option<&FilterConfiguration> {
        self.configuration.as_ref()
    }

    /// Whether no filters are present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value filters for `property`, if any were added.
    pub fn property_filters(&self, property: &str) -> Option<&[ValueFilter]> {
        self.data
            .property_filters
            .iter()
            .find(|p| p.property_name == property)
            .map(|p| p.value_filters.as_slice())
    }

    /// Remove every filter.
    pub fn clear(&mut self) -> &mut Self {
        self.data = EntityFilterData::default();
        self
    }

    pub(crate) fn operator_table(&self) -> OperatorTable {
        self.configuration
            .as_ref()
            .map(|c| c.operators.clone())
            .unwrap_or_default()
    }
}

impl<T: Filterable> EntityFilter<T> {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::from_data(EntityFilterData::default())
    }

    /// Add one value filter to a scalar property.
    pub fn add(&mut self, property: &str, filter: ValueFilter) -> FilterResult<&mut Self> {
        let descriptor = scalar_property(T::schema(), property)?;
        self.data.push_values(descriptor.name, [filter]);
        Ok(self)
    }

    /// Parse micro-syntax and add the resulting value filters.
    ///
    /// Uses the per-filter configuration's operator table when one is set.
    pub fn add_syntax(&mut self, property: &str, syntax: &str) -> FilterResult<&mut Self> {
        let descriptor = scalar_property(T::schema(), property)?;
        let filters = syntax::parse(syntax, &self.operator_table());
        self.data.push_values(descriptor.name, filters);
        Ok(self)
    }

    /// Add typed values under one operator.
    ///
    /// The value type must have the property's scalar type. For `IsNull` and
    /// `NotNull` the values are ignored and a single filter is added.
    pub fn add_values<V, I>(
        &mut self,
        property: &str,
        operator: FilterOperator,
        values: I,
    ) -> FilterResult<&mut Self>
    where
        V: FilterField,
        I: IntoIterator<Item = V>,
    {
        let schema = T::schema();
        let descriptor = scalar_property(schema, property)?;
        let field_type = descriptor.field_type().unwrap_or(V::FIELD_TYPE);
        if field_type.scalar != V::FIELD_TYPE.scalar {
            return Err(FilterError::invalid_property(
                schema.name,
                property,
                format!(
                    "expected values of type {}, got {}",
                    field_type, V::FIELD_TYPE
                ),
            ));
        }

        if operator.is_nullary() {
            self.data
                .push_values(descriptor.name, [ValueFilter::nullary(operator)]);
        } else {
            let filters: Vec<_> = values
                .into_iter()
                .map(|v| ValueFilter::create(operator, v))
                .collect();
            self.data.push_values(descriptor.name, filters);
        }
        Ok(self)
    }

    /// Replace the value filters of a scalar property.
    pub fn replace(
        &mut self,
        property: &str,
        filters: impl IntoIterator<Item = ValueFilter>,
    ) -> FilterResult<&mut Self> {
        let descriptor = scalar_property(T::schema(), property)?;
        self.data
            .property_filters
            .retain(|p| p.property_name != descriptor.name);
        self.data.push_values(descriptor.name, filters);
        Ok(self)
    }

    /// Replace the value filters of a scalar property with parsed micro-syntax.
    pub fn replace_syntax(&mut self, property: &str, syntax: &str) -> FilterResult<&mut Self> {
        let filters = syntax::parse(syntax, &self.operator_table());
        self.replace(property, filters)
    }

    /// Remove the value filters of a scalar property.
    pub fn remove(&mut self, property: &str) -> FilterResult<&mut Self> {
        let descriptor = scalar_property(T::schema(), property)?;
        self.data
            .property_filters
            .retain(|p| p.property_name != descriptor.name);
        Ok(self)
    }

    /// Add a filter for a nested object or collection property.
    ///
    /// Several nested filters on the same property are AND-combined.
    ///
    /// Nested filters compile under the parent's configuration; a
    /// configuration set on `filter` is not kept.
    pub fn add_nested<U: Filterable>(
        &mut self,
        property: &str,
        filter: EntityFilter<U>,
    ) -> FilterResult<&mut Self> {
        let descriptor = nested_property::<U>(T::schema(), property)?;
        if filter.configuration.is_some() {
            debug!(
                entity = T::schema().name,
                property = descriptor.name,
                "nested filter configuration replaced by the parent's"
            );
        }
        self.data.nested_filters.push(NestedFilter {
            property_name: descriptor.name.to_string(),
            entity_filter: filter.data,
        });
        Ok(self)
    }

    /// Replace the nested filters of a property.
    pub fn replace_nested<U: Filterable>(
        &mut self,
        property: &str,
        filter: EntityFilter<U>,
    ) -> FilterResult<&mut Self> {
        self.remove_nested(property)?;
        self.add_nested(property, filter)
    }

    /// Remove the nested filters of a property.
    pub fn remove_nested(&mut self, property: &str) -> FilterResult<&mut Self> {
        let schema = T::schema();
        let descriptor = schema
            .property(property)
            .filter(|p| p.nested_schema().is_some())
            .ok_or_else(|| {
                FilterError::invalid_property(schema.name, property, "not a nested property")
            })?;
        self.data
            .nested_filters
            .retain(|n| n.property_name != descriptor.name);
        Ok(self)
    }

    /// The first nested filter on `property`, typed as `U`.
    pub fn nested<U: Filterable>(&self, property: &str) -> Option<EntityFilter<U>> {
        let descriptor = nested_property::<U>(T::schema(), property).ok()?;
        self.data
            .nested_for(descriptor.name)
            .next()
            .map(|data| EntityFilter::from_data(data.clone()))
    }

    /// Convert into a filter for `U`.
    ///
    /// Filters on properties that `U` lacks, or whose type `U` cannot hold,
    /// are dropped. A nullable target accepts a non-nullable source. Nested
    /// filters are converted recursively.
    pub fn cast<U: Filterable>(&self) -> EntityFilter<U> {
        EntityFilter {
            data: self.data.cast(T::schema(), U::schema()),
            configuration: self.configuration.clone(),
            _entity: PhantomData,
        }
    }
}

/// Resolve a first-level scalar property.
fn scalar_property(
    schema: &'static EntitySchema,
    property: &str,
) -> FilterResult<&'static PropertyDescriptor> {
    let descriptor = lookup(schema, property)?;
    match descriptor.kind {
        PropertyKind::Scalar(_) => Ok(descriptor),
        PropertyKind::Nested { .. } => Err(FilterError::invalid_property(
            schema.name,
            property,
            "nested property; use add_nested",
        )),
    }
}

/// Resolve a first-level nested property whose entity type is `U`.
fn nested_property<U: Filterable>(
    schema: &'static EntitySchema,
    property: &str,
) -> FilterResult<&'static PropertyDescriptor> {
    let descriptor = lookup(schema, property)?;
    match descriptor.nested_schema() {
        Some((nested, _)) if std::ptr::eq(nested, U::schema()) => Ok(descriptor),
        Some((nested, _)) => Err(FilterError::invalid_property(
            schema.name,
            property,
            format!("holds {}, not {}", nested.name, U::schema().name),
        )),
        None => Err(FilterError::invalid_property(
            schema.name,
            property,
            "scalar property; use add",
        )),
    }
}

fn lookup(
    schema: &'static EntitySchema,
    property: &str,
) -> FilterResult<&'static PropertyDescriptor> {
    if property.contains('.') {
        return Err(FilterError::invalid_property(
            schema.name,
            property,
            "only first-level properties can be filtered; add a nested filter instead",
        ));
    }
    schema
        .property(property)
        .ok_or_else(|| FilterError::invalid_property(schema.name, property, "no such property"))
}

impl<T: Filterable> Default for EntityFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EntityFilter<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            configuration: self.configuration.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> PartialEq for EntityFilter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T> fmt::Debug for EntityFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityFilter")
            .field("entity", &std::any::type_name::<T>())
            .field("property_filters", &self.data.property_filters)
            .field("nested_filters", &self.data.nested_filters)
            .field("configuration", &self.configuration.is_some())
            .finish()
    }
}

impl<T> Serialize for EntityFilter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for EntityFilter<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        EntityFilterData::deserialize(deserializer).map(Self::from_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::FilterContext;
    use crate::config::NullSafety;
    use crate::filterable;
    use pretty_assertions::assert_eq;

    struct Address {
        city: String,
    }

    struct Person {
        name: String,
        age: i32,
        address: Option<Address>,
    }

    struct Employee {
        name: Option<String>,
        age: i64,
        address: Option<Address>,
    }

    filterable! {
        Address {
            city: String,
        }
    }

    filterable! {
        Person {
            name: String,
            age: i32,
        }
        nested {
            address: Option<Address>,
        }
    }

    filterable! {
        Employee {
            name: Option<String>,
            age: i64,
        }
        nested {
            address: Option<Address>,
        }
    }

    #[test]
    fn test_add_appends_to_property() {
        let mut filter = EntityFilter::<Person>::new();
        filter.add_syntax("name", "~jo").unwrap();
        filter.add("name", ValueFilter::new(FilterOperator::StartsWith, "A")).unwrap();
        assert_eq!(
            filter.property_filters("name").unwrap(),
            &[
                ValueFilter::new(FilterOperator::Contains, "jo"),
                ValueFilter::new(FilterOperator::StartsWith, "A"),
            ]
        );
        assert_eq!(filter.data().property_filters.len(), 1);
    }

    #[test]
    fn test_invalid_properties() {
        let mut filter = EntityFilter::<Person>::new();
        for property in ["address.city", "nickname", "address"] {
            let err = filter.add_syntax(property, "x").unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidPropertyExpression { .. }),
                "{property}: {err:?}"
            );
        }
        assert!(filter.add_nested("name", EntityFilter::<Address>::new()).is_err());
        assert!(filter.add_nested("address", EntityFilter::<Person>::new()).is_err());
    }

    #[test]
    fn test_add_values_checks_type() {
        let mut filter = EntityFilter::<Person>::new();
        filter
            .add_values("age", FilterOperator::GreaterThan, [18, 65])
            .unwrap();
        assert_eq!(filter.property_filters("age").unwrap().len(), 2);
        assert!(filter
            .add_values("age", FilterOperator::Default, ["18".to_string()])
            .is_err());
        filter
            .add_values("name", FilterOperator::IsNull, Vec::<String>::new())
            .unwrap();
        assert_eq!(filter.property_filters("name").unwrap(), &[ValueFilter::is_null()]);
    }

    #[test]
    fn test_replace_remove_clear() {
        let mut filter = EntityFilter::<Person>::new();
        filter.add_syntax("name", "a,b").unwrap();
        filter.replace_syntax("name", "c").unwrap();
        assert_eq!(
            filter.property_filters("name").unwrap(),
            &[ValueFilter::new(FilterOperator::Default, "c")]
        );
        filter.remove("name").unwrap();
        assert!(filter.property_filters("name").is_none());

        let mut city = EntityFilter::<Address>::new();
        city.add_syntax("city", "NYC").unwrap();
        filter.add_nested("address", city.clone()).unwrap();
        assert_eq!(filter.nested::<Address>("address"), Some(city));
        filter.remove_nested("address").unwrap();
        assert!(filter.is_empty());

        filter.add_syntax("age", "1").unwrap();
        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_nested_filter_inherits_configuration() {
        let ctx = FilterContext::default();
        let mut plain = EntityFilter::<Address>::new();
        plain.add_syntax("city", "NYC").unwrap();
        let configured = plain
            .clone()
            .with_configuration(FilterConfiguration::default().with_null_safety(NullSafety::Always));

        let mut expected = EntityFilter::<Person>::new();
        expected.add_nested("address", plain).unwrap();
        let mut filter = EntityFilter::<Person>::new();
        filter.add_nested("address", configured).unwrap();

        assert!(filter.nested::<Address>("address").unwrap().configuration().is_none());
        assert_eq!(filter, expected);
        assert_eq!(
            filter.deferred_expr(&ctx).unwrap(),
            expected.deferred_expr(&ctx).unwrap()
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = EntityFilter::<Person>::new();
        original.add_syntax("name", "a").unwrap();
        let copy = original.clone();
        original.add_syntax("name", "b").unwrap();
        assert_eq!(copy.property_filters("name").unwrap().len(), 1);
    }

    #[test]
    fn test_cast() {
        let mut city = EntityFilter::<Address>::new();
        city.add_syntax("city", "NYC").unwrap();
        let mut filter = EntityFilter::<Person>::new();
        filter.add_syntax("name", "jo").unwrap();
        filter.add_syntax("age", ">3").unwrap();
        filter.add_nested("address", city).unwrap();

        let cast = filter.cast::<Employee>();
        // String -> Option<String> is kept, i32 -> i64 is dropped.
        assert!(cast.property_filters("name").is_some());
        assert!(cast.property_filters("age").is_none());
        assert!(cast.nested::<Address>("address").is_some());

        // Option<String> -> String is dropped.
        let back = cast.cast::<Person>();
        assert!(back.property_filters("name").is_none());
    }

    #[test]
    fn test_serde_wire_format() {
        let mut filter = EntityFilter::<Person>::new();
        filter.add_syntax("name", "~jo,ISNULL").unwrap();
        let mut city = EntityFilter::<Address>::new();
        city.add_syntax("city", "=NYC").unwrap();
        filter.add_nested("address", city).unwrap();

        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "propertyFilters": [
                    { "propertyName": "name", "valueFilters": ["~jo", "ISNULL"] }
                ],
                "nestedFilters": [
                    {
                        "propertyName": "address",
                        "entityFilter": {
                            "propertyFilters": [
                                { "propertyName": "city", "valueFilters": ["=NYC"] }
                            ],
                            "nestedFilters": []
                        }
                    }
                ]
            })
        );
        let back: EntityFilter<Person> = serde_json::from_value(json).unwrap();
        assert_eq!(back, filter);
    }
}
