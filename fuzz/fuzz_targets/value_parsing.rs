//! Fuzz target for per-type value parsing.
//!
//! Feeds arbitrary raw values through compilation for every scalar family.
//! Errors are expected; panics are not.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_value_parsing
//! ```

#![no_main]

use arbitrary::Arbitrary;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use sieve_query::{filterable, EntityFilter, FilterConfiguration, FilterContext, Locale};

pub struct Sample {
    pub flag: Option<bool>,
    pub small: i8,
    pub large: u64,
    pub ratio: f32,
    pub amount: f64,
    pub due: Option<NaiveDate>,
}

filterable! {
    Sample {
        flag: Option<bool>,
        small: i8,
        large: u64,
        ratio: f32,
        amount: f64,
        due: Option<NaiveDate>,
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    property: u8,
    raw: String,
    locale: u8,
    ignore_errors: bool,
}

fuzz_target!(|input: Input| {
    let properties = ["flag", "small", "large", "ratio", "amount", "due"];
    let property = properties[usize::from(input.property) % properties.len()];
    let locales = ["invariant", "en-US", "de-DE", "fr-FR"];
    let tag = locales[usize::from(input.locale) % locales.len()];
    let Some(locale) = Locale::from_tag(tag) else {
        return;
    };

    let mut filter = EntityFilter::<Sample>::new();
    if filter.add_syntax(property, &input.raw).is_err() {
        return;
    }
    let config = FilterConfiguration::default()
        .with_locale(locale)
        .ignore_parse_errors(input.ignore_errors);
    let _ = filter.predicate(&FilterContext::new(config));
});
