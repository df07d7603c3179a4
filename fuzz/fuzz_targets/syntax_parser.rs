//! Fuzz target for the micro-syntax parser.
//!
//! Parsing never fails, and rendering then re-parsing must reproduce the
//! same value filters.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_syntax_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::{syntax, OperatorTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let table = OperatorTable::default();
        let filters = syntax::parse(input, &table);
        let rendered = syntax::render(&filters, &table);
        assert_eq!(syntax::parse(&rendered, &table), filters);
    }
});
