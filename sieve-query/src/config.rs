//! Filter configuration and `sieve.toml` loading.
//!
//! Configuration is passed explicitly through a
//! [`FilterContext`](crate::FilterContext); there is no process-wide default
//! to mutate. An [`EntityFilter`](crate::EntityFilter) may carry its own
//! configuration, which then wins over the context's.
//!
//! ```rust
//! use sieve_query::{FilterConfiguration, NullSafety};
//!
//! let config = FilterConfiguration::from_toml_str(r#"
//!     [filter]
//!     locale = "de-DE"
//!     ignore_parse_errors = true
//!     null_safety = "always"
//! "#).unwrap();
//! assert_eq!(config.locale.tag(), "de-DE");
//! assert_eq!(config.null_safety, NullSafety::Always);
//! ```

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::error::{FilterError, FilterResult};
use crate::locale::Locale;
use crate::operator::OperatorTable;

/// When nested property access is guarded by an explicit not-null check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullSafety {
    /// Guard when compiling for in-memory evaluation, not for deferred translation.
    #[default]
    Auto,
    /// Always guard.
    Always,
    /// Never guard.
    Never,
}

/// Source of "now" for relative date expressions.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>);

impl Clock {
    /// Clock backed by a function.
    pub fn new<F>(now: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        Self(Arc::new(now))
    }

    /// Clock frozen at `instant`.
    pub fn fixed(instant: DateTime<FixedOffset>) -> Self {
        Self::new(move || instant)
    }

    /// System clock in the local time zone.
    pub fn system() -> Self {
        Self::new(|| Local::now().fixed_offset())
    }

    /// Current instant.
    #[inline]
    pub fn now(&self) -> DateTime<FixedOffset> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Clock").field(&self.now()).finish()
    }
}

/// Settings that affect value parsing and predicate composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfiguration {
    /// Locale for numbers and ambiguous dates.
    pub locale: Locale,

    /// Extra words parsed as `true` (case-insensitive).
    pub true_literals: Vec<String>,

    /// Extra words parsed as `false` (case-insensitive).
    pub false_literals: Vec<String>,

    /// Omit unparsable values instead of failing.
    pub ignore_parse_errors: bool,

    /// Null-guard policy for nested properties.
    pub null_safety: NullSafety,

    /// Operator literals for the micro-syntax.
    pub operators: OperatorTable,

    /// Clock for relative dates.
    #[serde(skip)]
    pub clock: Clock,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            locale: Locale::invariant(),
            true_literals: ["1", "yes", "y", "on"].map(String::from).to_vec(),
            false_literals: ["0", "no", "n", "off"].map(String::from).to_vec(),
            ignore_parse_errors: false,
            null_safety: NullSafety::Auto,
            operators: OperatorTable::default(),
            clock: Clock::system(),
        }
    }
}

impl FilterConfiguration {
    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Omit unparsable values instead of failing.
    pub fn ignore_parse_errors(mut self, ignore: bool) -> Self {
        self.ignore_parse_errors = ignore;
        self
    }

    /// Set the null-guard policy.
    pub fn with_null_safety(mut self, null_safety: NullSafety) -> Self {
        self.null_safety = null_safety;
        self
    }

    /// Replace the true/false literal sets.
    pub fn with_bool_literals<T, F>(mut self, true_literals: T, false_literals: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.true_literals = true_literals.into_iter().map(Into::into).collect();
        self.false_literals = false_literals.into_iter().map(Into::into).collect();
        self
    }

    /// Set the operator table.
    pub fn with_operators(mut self, operators: OperatorTable) -> Self {
        self.operators = operators;
        self
    }

    /// Load the `[filter]` table of a `sieve.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> FilterResult<Self> {
        Ok(SieveConfig::from_file(path)?.filter)
    }

    /// Parse the `[filter]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> FilterResult<Self> {
        Ok(SieveConfig::from_toml_str(content)?.filter)
    }
}

/// Top-level structure of `sieve.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SieveConfig {
    /// Filter settings.
    #[serde(default)]
    pub filter: FilterConfiguration,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, FilterOverride>,
}

/// Per-environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOverride {
    pub locale: Option<Locale>,
    pub ignore_parse_errors: Option<bool>,
    pub null_safety: Option<NullSafety>,
}

impl SieveConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> FilterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FilterError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` references.
    pub fn from_toml_str(content: &str) -> FilterResult<Self> {
        let expanded = expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| FilterError::Toml { source: e })
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(locale) = overrides.locale {
                self.filter.locale = locale;
            }
            if let Some(ignore) = overrides.ignore_parse_errors {
                self.filter.ignore_parse_errors = ignore;
            }
            if let Some(null_safety) = overrides.null_safety {
                self.filter.null_safety = null_safety;
            }
        }
        self
    }

    /// Apply the overrides of a declared environment.
    ///
    /// Unlike [`with_environment`](Self::with_environment), an environment
    /// missing from `[environments]` is an error.
    pub fn select_environment(self, env: &str) -> FilterResult<Self> {
        if !self.environments.contains_key(env) {
            let mut declared: Vec<&str> = self.environments.keys().map(String::as_str).collect();
            declared.sort_unstable();
            return Err(FilterError::config(format!(
                "unknown environment `{env}` (declared: {})",
                declared.join(", ")
            )));
        }
        Ok(self.with_environment(env))
    }
}

static ENV_VAR: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"\$\{([^}]+)\}").ok());

/// Expand `${VAR}` references; unknown variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let Some(re) = ENV_VAR.as_ref() else {
        return content.to_string();
    };
    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::FilterOperator;
    use chrono::TimeZone;

    #[test]
    fn test_default_config() {
        let config = FilterConfiguration::default();
        assert_eq!(config.locale, Locale::invariant());
        assert!(!config.ignore_parse_errors);
        assert_eq!(config.null_safety, NullSafety::Auto);
        assert!(config.true_literals.contains(&"yes".to_string()));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [filter]
            locale = "en-GB"
            true_literals = ["ja"]
            false_literals = ["nein"]

            [filter.operators]
            "eq:" = "EqualCaseSensitive"
            "null" = "IsNull"

            [environments.production]
            ignore_parse_errors = true
        "#;

        let config = SieveConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.filter.locale.tag(), "en-GB");
        assert_eq!(config.filter.true_literals, vec!["ja".to_string()]);
        assert_eq!(
            config.filter.operators.match_prefix("eq:x"),
            Some((FilterOperator::EqualCaseSensitive, "x"))
        );

        let production = config.with_environment("production");
        assert!(production.filter.ignore_parse_errors);
    }

    #[test]
    fn test_select_environment() {
        let toml = r#"
            [environments.staging]
            null_safety = "never"

            [environments.production]
            ignore_parse_errors = true
        "#;
        let config = SieveConfig::from_toml_str(toml).unwrap();

        let staging = config.clone().select_environment("staging").unwrap();
        assert_eq!(staging.filter.null_safety, NullSafety::Never);

        let err = config.select_environment("qa").unwrap_err();
        assert!(matches!(err, FilterError::Config { .. }));
        assert_eq!(
            err.to_string(),
            "configuration error: unknown environment `qa` (declared: production, staging)"
        );
    }

    #[test]
    fn test_unknown_locale_is_rejected() {
        let err = FilterConfiguration::from_toml_str("[filter]\nlocale = \"xx\"").unwrap_err();
        assert!(matches!(err, FilterError::Toml { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(FilterConfiguration::from_toml_str("[filter]\ncolour = 1").is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let instant = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 15, 12, 0, 0)
            .unwrap();
        let config = FilterConfiguration::default().with_clock(Clock::fixed(instant));
        assert_eq!(config.clock.now(), instant);
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: This test runs single-threaded and we clean up after
        unsafe {
            std::env::set_var("SIEVE_TEST_LOCALE", "de-DE");
        }
        let expanded = expand_env_vars("locale = \"${SIEVE_TEST_LOCALE}\"");
        assert_eq!(expanded, "locale = \"de-DE\"");
        unsafe {
            std::env::remove_var("SIEVE_TEST_LOCALE");
        }
    }
}
