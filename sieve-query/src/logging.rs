//! Logging bootstrap for applications embedding sieve.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the application. With the `tracing-subscriber` feature this
//! module offers a ready-made one controlled by environment variables:
//!
//! - `SIEVE_DEBUG=true|1|yes` - enable debug logging
//! - `SIEVE_LOG_LEVEL=trace|debug|info|warn|error` - set the level
//! - `SIEVE_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! ```rust,no_run
//! use sieve_query::logging;
//!
//! logging::init();
//! ```
//!
//! Events emitted while compiling filters:
//!
//! | level | event |
//! |-------|-------|
//! | `debug` | compiled property predicate, interceptor takeover, unknown property skipped |
//! | `trace` | each compiled value filter and the creator that handled it |
//! | `warn`  | a value omitted under `ignore_parse_errors` |

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Whether `SIEVE_DEBUG` asks for debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIEVE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The level from `SIEVE_LOG_LEVEL`.
///
/// Defaults to "debug" when `SIEVE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("SIEVE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The format from `SIEVE_LOG_FORMAT`, "json" by default.
pub fn get_log_format() -> &'static str {
    env::var("SIEVE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install the global subscriber.
///
/// Does nothing unless `SIEVE_DEBUG` or `SIEVE_LOG_LEVEL` is set, or when
/// the `tracing-subscriber` feature is disabled. Subsequent calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SIEVE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("sieve={level},sieve_query={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            // try_init: an application may already own the global subscriber.
            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = get_log_format(), "sieve logging initialized");
            }
        }
    });
}

/// Set `SIEVE_LOG_LEVEL` and initialize.
///
/// # Safety
///
/// Modifies the process environment; call before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as a startup-only call.
    unsafe {
        env::set_var("SIEVE_LOG_LEVEL", level);
    }
    init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            env::remove_var("SIEVE_DEBUG");
            env::remove_var("SIEVE_LOG_LEVEL");
            env::remove_var("SIEVE_LOG_FORMAT");
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
        assert_eq!(get_log_format(), "json");
    }
}
