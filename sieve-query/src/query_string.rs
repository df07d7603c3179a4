//! Query-string encoding of entity filters.
//!
//! Each scalar property becomes one `name=syntax` pair. Nested properties
//! are addressed with dotted keys (`address.city=nyc`). Property names can be
//! rewritten on the way out and are matched under the same naming on the way
//! in.
//!
//! ```rust
//! use sieve_query::{filterable, EntityFilter, PropertyNaming};
//!
//! pub struct Order {
//!     pub order_number: u32,
//! }
//!
//! filterable! {
//!     Order {
//!         order_number: u32,
//!     }
//! }
//!
//! let mut filter = EntityFilter::<Order>::new();
//! filter.add_syntax("order_number", ">100,<200").unwrap();
//!
//! let query = filter.to_query_string(PropertyNaming::CamelCase);
//! assert_eq!(query, "orderNumber=%3E100%2C%3C200");
//!
//! let decoded = EntityFilter::<Order>::from_query_string(&query, PropertyNaming::CamelCase);
//! assert_eq!(decoded, filter);
//! ```

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use crate::entity::{EntityFilter, EntityFilterData};
use crate::operator::OperatorTable;
use crate::schema::{EntitySchema, Filterable};
use crate::syntax;

/// How property names appear in query strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyNaming {
    /// Names as declared.
    #[default]
    AsIs,
    /// `orderNumber`.
    CamelCase,
    /// `order_number`.
    SnakeCase,
    /// `order-number`.
    KebabCase,
}

impl PropertyNaming {
    /// Rewrite a declared property name.
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::AsIs => name.to_string(),
            Self::CamelCase => name.to_case(Case::Camel),
            Self::SnakeCase => name.to_case(Case::Snake),
            Self::KebabCase => name.to_case(Case::Kebab),
        }
    }

    fn matches(self, declared: &str, key: &str) -> bool {
        declared == key || self.apply(declared) == key
    }
}

impl<T> EntityFilter<T> {
    /// Flatten into `(key, syntax)` pairs.
    ///
    /// Several nested filters on one property are merged under the same key
    /// prefix, so they decode as a single nested filter.
    pub fn to_query_pairs(&self, naming: PropertyNaming) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        collect_pairs(self.data(), "", naming, &self.operator_table(), &mut pairs);
        pairs
    }

    /// Encode as an `application/x-www-form-urlencoded` string.
    pub fn to_query_string(&self, naming: PropertyNaming) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs(naming))
            .finish()
    }
}

impl<T: Filterable> EntityFilter<T> {
    /// Decode a query string produced by [`EntityFilter::to_query_string`].
    ///
    /// Keys that do not resolve to a property are skipped.
    pub fn from_query_string(query: &str, naming: PropertyNaming) -> Self {
        let mut filter = Self::new();
        filter.merge_query_string(query, naming);
        filter
    }

    /// Add the filters of a query string to this filter.
    ///
    /// Values are parsed with this filter's operator table.
    pub fn merge_query_string(&mut self, query: &str, naming: PropertyNaming) -> &mut Self {
        let table = self.operator_table();
        let mut data = self.data().clone();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if !insert_pair(&mut data, T::schema(), &key, &value, naming, &table) {
                debug!(entity = T::schema().name, key = %key, "skipping unknown query key");
            }
        }
        let configuration = self.configuration().cloned();
        *self = Self::from_data(data);
        self.set_configuration(configuration)
    }
}

fn collect_pairs(
    data: &EntityFilterData,
    prefix: &str,
    naming: PropertyNaming,
    table: &OperatorTable,
    pairs: &mut Vec<(String, String)>,
) {
    for property in &data.property_filters {
        if property.value_filters.is_empty() {
            continue;
        }
        pairs.push((
            format!("{prefix}{}", naming.apply(&property.property_name)),
            syntax::render(&property.value_filters, table),
        ));
    }
    for nested in &data.nested_filters {
        let prefix = format!("{prefix}{}.", naming.apply(&nested.property_name));
        collect_pairs(&nested.entity_filter, &prefix, naming, table, pairs);
    }
}

/// Place one decoded pair; `false` when the key names no property.
fn insert_pair(
    data: &mut EntityFilterData,
    schema: &'static EntitySchema,
    key: &str,
    value: &str,
    naming: PropertyNaming,
    table: &OperatorTable,
) -> bool {
    let (head, rest) = match key.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (key, None),
    };
    let Some(descriptor) = schema
        .properties
        .iter()
        .find(|p| naming.matches(p.name, head))
    else {
        return false;
    };

    match (rest, descriptor.nested_schema()) {
        (None, None) => {
            data.push_values(descriptor.name, syntax::parse(value, table));
            true
        }
        (Some(rest), Some((nested, _))) => {
            // Probe first so unknown keys leave no empty nested entry behind.
            let mut scratch = EntityFilterData::default();
            if !insert_pair(&mut scratch, nested, rest, value, naming, table) {
                return false;
            }
            merge(data.nested_mut(descriptor.name), scratch);
            true
        }
        _ => false,
    }
}

fn merge(target: &mut EntityFilterData, source: EntityFilterData) {
    for property in source.property_filters {
        target.push_values(&property.property_name, property.value_filters);
    }
    for nested in source.nested_filters {
        merge(target.nested_mut(&nested.property_name), nested.entity_filter);
    }
}
