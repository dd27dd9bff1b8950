//! Emit-or-skip decision and line rendering for executed statements.

use std::sync::Arc;

use crate::config::StatementLogConfig;
use crate::event::{Origin, StatementEvent};
use crate::sink::LogSink;

/// Decides whether a statement is logged and renders its lines.
///
/// Holds only the shared, read-only configuration, so one filter can serve
/// any number of connections concurrently.
#[derive(Debug, Clone, Default)]
pub struct StatementFilter {
    config: Arc<StatementLogConfig>,
}

impl StatementFilter {
    /// Create a filter owning `config`.
    pub fn new(config: StatementLogConfig) -> Self {
        Self::from_shared(Arc::new(config))
    }

    /// Create a filter over a configuration shared with other filters.
    pub fn from_shared(config: Arc<StatementLogConfig>) -> Self {
        Self { config }
    }

    /// Get the filter configuration.
    pub fn config(&self) -> &StatementLogConfig {
        &self.config
    }

    /// Whether `event` passes the category lists and origin check.
    pub fn should_emit(&self, event: &StatementEvent) -> bool {
        self.is_eligible(&event.category, event.origin)
    }

    /// Whether statements of `category` issued by `origin` are logged.
    ///
    /// Exclusion always wins over inclusion. With `dbunit_enabled` off, only
    /// statements issued by the application are logged.
    pub fn is_eligible(&self, category: &str, origin: Origin) -> bool {
        let config = &self.config;

        if config.excluded_categories.contains(category) {
            return false;
        }

        if !config.included_categories.is_empty()
            && !config.included_categories.contains(category)
        {
            return false;
        }

        config.dbunit_enabled || origin == Origin::Application
    }

    /// Render the lines to log for `event`: the prepared form first, then the
    /// literal SQL form. Disabled or blank texts are skipped.
    pub fn handle(&self, event: &StatementEvent) -> Vec<String> {
        if !self.should_emit(event) {
            return Vec::new();
        }

        let config = &self.config;
        let mut lines = Vec::with_capacity(2);

        if config.prepared_enabled && !event.prepared.trim().is_empty() {
            lines.push(config.format.render(event, &event.prepared));
        }

        if config.sql_enabled && !event.sql.trim().is_empty() {
            lines.push(config.format.render(event, &event.sql));
        }

        lines
    }

    /// Pass every line from [`handle`](Self::handle) to `sink`.
    pub fn emit(&self, event: &StatementEvent, sink: &dyn LogSink) {
        for line in self.handle(event) {
            sink.append(&line);
        }
    }
}
