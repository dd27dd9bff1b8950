//! Configuration for statement logging.

use std::collections::HashSet;

use crate::format::StatementFormat;

/// Property key for the comma-separated list of categories never logged.
pub const EXCLUDE_CATEGORIES_KEY: &str = "excludecategories";
/// Property key for the comma-separated list of categories allowed.
pub const INCLUDE_CATEGORIES_KEY: &str = "includecategories";
/// Property key toggling output of the parameterized statement text.
pub const PREPARED_ENABLED_KEY: &str = "commons.enable.preparedstatement";
/// Property key toggling output of the literal SQL text.
pub const SQL_ENABLED_KEY: &str = "commons.enable.sqlstatement";
/// Property key toggling output of statements not issued by the application.
pub const DBUNIT_ENABLED_KEY: &str = "commons.enable.dbunitstatement";
/// Property key for the output template.
pub const FORMAT_KEY: &str = "commons.format";

/// Settings deciding which statements are logged and how each line looks.
///
/// Built once and shared read-only by every connection that logs through it.
///
/// # Example
///
/// ```rust
/// use sea_orm_statement_log::StatementLogConfig;
///
/// let config = StatementLogConfig::default()
///     .with_excluded_categories(["debug", "info"])
///     .with_sql_statements(false)
///     .with_format("%cid|%e|%cat|%s");
/// ```
#[derive(Debug, Clone)]
pub struct StatementLogConfig {
    /// Categories that are never logged. Wins over `included_categories`.
    /// Default: empty
    pub excluded_categories: HashSet<String>,

    /// When non-empty, only these categories are logged.
    /// Default: empty
    pub included_categories: HashSet<String>,

    /// Whether to log the parameterized form of a statement.
    /// Default: `true`
    pub prepared_enabled: bool,

    /// Whether to log the literal SQL form of a statement.
    /// Default: `true`
    pub sql_enabled: bool,

    /// Whether statements not issued by the application (fixture loading,
    /// maintenance tooling) are logged as well.
    /// Default: `true`
    pub dbunit_enabled: bool,

    /// Output template.
    /// Default: `%e[ms] %s`
    pub format: StatementFormat,
}

impl Default for StatementLogConfig {
    fn default() -> Self {
        Self {
            excluded_categories: HashSet::new(),
            included_categories: HashSet::new(),
            prepared_enabled: true,
            sql_enabled: true,
            dbunit_enabled: true,
            format: StatementFormat::default(),
        }
    }
}

impl StatementLogConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from already-loaded key/value properties.
    ///
    /// Missing or blank values fall back to their defaults; unknown keys are
    /// ignored. This never fails.
    ///
    /// ```rust
    /// use sea_orm_statement_log::StatementLogConfig;
    ///
    /// let config = StatementLogConfig::from_properties([
    ///     ("excludecategories", "info, debug"),
    ///     ("commons.enable.sqlstatement", "false"),
    /// ]);
    /// assert!(config.excluded_categories.contains("debug"));
    /// assert!(!config.sql_enabled);
    /// ```
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut excluded = None;
        let mut included = None;
        let mut prepared = None;
        let mut sql = None;
        let mut dbunit = None;
        let mut format = None;

        for (key, value) in properties {
            let value = value.as_ref().to_string();
            match key.as_ref() {
                EXCLUDE_CATEGORIES_KEY => excluded = Some(value),
                INCLUDE_CATEGORIES_KEY => included = Some(value),
                PREPARED_ENABLED_KEY => prepared = Some(value),
                SQL_ENABLED_KEY => sql = Some(value),
                DBUNIT_ENABLED_KEY => dbunit = Some(value),
                FORMAT_KEY => format = Some(value),
                _ => {}
            }
        }

        Self {
            excluded_categories: parse_categories(EXCLUDE_CATEGORIES_KEY, excluded.as_deref()),
            included_categories: parse_categories(INCLUDE_CATEGORIES_KEY, included.as_deref()),
            prepared_enabled: parse_flag(PREPARED_ENABLED_KEY, prepared.as_deref()),
            sql_enabled: parse_flag(SQL_ENABLED_KEY, sql.as_deref()),
            dbunit_enabled: parse_flag(DBUNIT_ENABLED_KEY, dbunit.as_deref()),
            format: parse_format(format.as_deref()),
        }
    }

    /// Set the categories that are never logged.
    pub fn with_excluded_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict logging to the given categories. An empty list allows all.
    pub fn with_included_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable logging of the parameterized statement text.
    pub fn with_prepared_statements(mut self, enabled: bool) -> Self {
        self.prepared_enabled = enabled;
        self
    }

    /// Enable or disable logging of the literal SQL text.
    ///
    /// **Security Warning**: the literal form has bound values inlined and may
    /// expose user input or credentials.
    pub fn with_sql_statements(mut self, enabled: bool) -> Self {
        self.sql_enabled = enabled;
        self
    }

    /// Enable or disable logging of statements not issued by the application.
    pub fn with_dbunit_statements(mut self, enabled: bool) -> Self {
        self.dbunit_enabled = enabled;
        self
    }

    /// Set the output template. A blank template selects the default.
    pub fn with_format(mut self, template: impl Into<String>) -> Self {
        self.format = parse_format(Some(&template.into()));
        self
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn parse_categories(key: &str, value: Option<&str>) -> HashSet<String> {
    match value {
        Some(v) if !is_blank(value) => v
            .trim()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        _ => {
            tracing::debug!(key, "no categories configured");
            HashSet::new()
        }
    }
}

fn parse_flag(key: &str, value: Option<&str>) -> bool {
    match value {
        Some(v) if !is_blank(value) => {
            let enabled = v.eq_ignore_ascii_case("true");
            if !enabled && !v.eq_ignore_ascii_case("false") {
                tracing::debug!(key, value = v, "unrecognized flag value, treating as false");
            }
            enabled
        }
        _ => {
            tracing::debug!(key, "flag not set, defaulting to true");
            true
        }
    }
}

fn parse_format(value: Option<&str>) -> StatementFormat {
    match value {
        Some(v) if !is_blank(value) => StatementFormat::new(v),
        _ => {
            tracing::debug!(key = FORMAT_KEY, "format not set, using default");
            StatementFormat::default()
        }
    }
}
