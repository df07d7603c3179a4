//! Fuzz target for the `sieve.toml` parser.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::SieveConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // The parser should never panic, only return errors
        if let Ok(config) = SieveConfig::from_toml_str(input) {
            let _ = config.select_environment("production");
        }
    }
});
