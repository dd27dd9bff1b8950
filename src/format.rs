//! Output template rendering.

use crate::event::StatementEvent;

/// Template used when none is configured.
pub const DEFAULT_FORMAT: &str = "%e[ms] %s";

/// A log line template.
///
/// The following placeholders are substituted; everything else is copied
/// literally:
///
/// | Placeholder | Value |
/// |-------------|-------|
/// | `%cid` | connection id |
/// | `%e` | elapsed time in milliseconds |
/// | `%cat` | statement category |
/// | `%s` | statement text |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFormat {
    template: String,
}

impl StatementFormat {
    /// Wrap a template string as-is.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render one line for `statement`, taking the remaining fields from `event`.
    ///
    /// Placeholders are replaced in the order `%cid`, `%e`, `%cat`, `%s`, each
    /// pass scanning the output of the previous one. The statement text goes in
    /// last and is never rescanned.
    pub fn render(&self, event: &StatementEvent, statement: &str) -> String {
        self.template
            .replace("%cid", &event.connection_id.to_string())
            .replace("%e", &event.elapsed_ms.to_string())
            .replace("%cat", &event.category)
            .replace("%s", statement)
    }
}

impl Default for StatementFormat {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

impl std::fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}
