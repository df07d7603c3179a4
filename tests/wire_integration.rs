//! Integration tests for the wire formats and configuration loading.
//!
//! These tests verify:
//! - JSON filters received from a client compile like locally built ones
//! - Query-string encoding under each naming strategy
//! - `sieve.toml` configuration and environment overrides

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sieve::prelude::*;
use sieve::{EntityFilterData, FilterConfiguration, Locale, SieveConfig};
use uuid::Uuid;

pub struct Line {
    pub sku: Uuid,
    pub unit_price: Decimal,
}

pub struct Invoice {
    pub invoice_number: u32,
    pub customer_name: String,
    pub total: Decimal,
    pub lines: Vec<Line>,
}

filterable! {
    Line {
        sku: Uuid,
        unit_price: Decimal,
    }
}

filterable! {
    Invoice {
        invoice_number: u32,
        customer_name: String,
        total: Decimal,
    }
    nested {
        lines: Vec<Line>,
    }
}

const SKU: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

fn invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            invoice_number: 1001,
            customer_name: "Acme Corp".into(),
            total: Decimal::new(12_550, 2),
            lines: vec![Line {
                sku: Uuid::parse_str(SKU).unwrap(),
                unit_price: Decimal::new(12_550, 2),
            }],
        },
        Invoice {
            invoice_number: 1002,
            customer_name: "Globex".into(),
            total: Decimal::new(9_900, 2),
            lines: Vec::new(),
        },
    ]
}

fn numbers(filter: &EntityFilter<Invoice>, ctx: &FilterContext) -> Vec<u32> {
    let invoices = invoices();
    filter
        .apply(ctx, invoices.iter())
        .unwrap()
        .map(|i| i.invoice_number)
        .collect()
}

#[test]
fn test_json_from_client_compiles() {
    let json = format!(
        r#"{{
            "propertyFilters": [
                {{ "propertyName": "total", "valueFilters": [">100"] }}
            ],
            "nestedFilters": [
                {{
                    "propertyName": "lines",
                    "entityFilter": {{
                        "propertyFilters": [
                            {{ "propertyName": "sku", "valueFilters": ["{SKU}"] }}
                        ]
                    }}
                }}
            ]
        }}"#
    );
    let filter: EntityFilter<Invoice> = serde_json::from_str(&json).unwrap();
    assert_eq!(numbers(&filter, &FilterContext::default()), vec![1001]);
}

#[test]
fn test_json_with_unknown_properties_is_lenient() {
    let json = r#"{"propertyFilters":[{"propertyName":"discount","valueFilters":["5"]}]}"#;
    let filter: EntityFilter<Invoice> = serde_json::from_str(json).unwrap();
    assert!(!filter.is_empty());
    assert_eq!(numbers(&filter, &FilterContext::default()), vec![1001, 1002]);
}

#[test]
fn test_untyped_data_round_trip() {
    let filter = entity_filter!(Invoice { customer_name: "^acme", total: "<=125.50" }).unwrap();
    let json = serde_json::to_string(filter.data()).unwrap();
    let data: EntityFilterData = serde_json::from_str(&json).unwrap();
    assert_eq!(EntityFilter::<Invoice>::from_data(data), filter);
}

#[test]
fn test_query_string_round_trip() {
    let mut lines = EntityFilter::<Line>::new();
    lines.add_syntax("unit_price", ">=100").unwrap();
    let mut filter = entity_filter!(Invoice { customer_name: "acme,globex" }).unwrap();
    filter.add_nested("lines", lines).unwrap();

    let query = filter.to_query_string(PropertyNaming::CamelCase);
    assert_eq!(
        query,
        "customerName=acme%2Cglobex&lines.unitPrice=%3E%3D100"
    );

    let decoded = EntityFilter::<Invoice>::from_query_string(&query, PropertyNaming::CamelCase);
    assert_eq!(decoded, filter);
    assert_eq!(numbers(&decoded, &FilterContext::default()), vec![1001]);
}

#[test]
fn test_query_string_ignores_unknown_keys() {
    let filter = EntityFilter::<Invoice>::from_query_string(
        "page=2&invoice-number=1002&sort=total",
        PropertyNaming::KebabCase,
    );
    assert_eq!(numbers(&filter, &FilterContext::default()), vec![1002]);
}

#[test]
fn test_configuration_from_toml() {
    let config = SieveConfig::from_toml_str(
        r#"
        [filter]
        locale = "de-DE"

        [environments.lenient]
        ignore_parse_errors = true
        "#,
    )
    .unwrap();
    assert_eq!(config.filter.locale, Locale::from_tag("de-DE").unwrap());

    let filter = entity_filter!(Invoice { total: r"125\,50" }).unwrap();
    let ctx = FilterContext::new(config.filter.clone());
    assert_eq!(numbers(&filter, &ctx), vec![1001]);

    let broken = entity_filter!(Invoice { total: "lots,99" }).unwrap();
    assert!(broken.predicate(&ctx).is_err());

    assert!(config.clone().select_environment("strict").is_err());
    let lenient = FilterContext::new(config.select_environment("lenient").unwrap().filter);
    assert_eq!(numbers(&broken, &lenient), vec![1002]);
}

#[test]
fn test_custom_operator_literals() {
    let config = FilterConfiguration::from_toml_str(
        r#"
        [filter.operators]
        "gt:" = "GreaterThan"
        "eq:" = "EqualCaseSensitive"
        "#,
    )
    .unwrap();

    let mut filter = EntityFilter::<Invoice>::new().with_configuration(config);
    filter.add_syntax("invoice_number", "gt:1001").unwrap();
    assert_eq!(numbers(&filter, &FilterContext::default()), vec![1002]);
    assert_eq!(
        filter.to_query_pairs(PropertyNaming::AsIs),
        vec![("invoice_number".to_string(), "gt:1001".to_string())]
    );
}
