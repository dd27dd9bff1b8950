//! Per-statement event passed from the connection adapter to the filter.

/// Which component issued a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// The application's own persistence layer.
    #[default]
    Application,
    /// A test-data setup tool loading fixtures.
    DbUnit,
    /// Anything else (migrations, maintenance jobs).
    Other,
}

impl Origin {
    /// Lowercase name of the origin.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Application => "application",
            Origin::DbUnit => "dbunit",
            Origin::Other => "other",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementEvent {
    /// Id of the connection handle that ran the statement.
    pub connection_id: u64,
    /// Execution time in milliseconds.
    pub elapsed_ms: u64,
    /// Category used for include/exclude filtering.
    pub category: String,
    /// Parameterized text with placeholders; empty for unprepared statements.
    pub prepared: String,
    /// Literal SQL with any bound values inlined.
    pub sql: String,
    /// Component that issued the statement.
    pub origin: Origin,
}
