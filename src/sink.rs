//! Destinations for rendered log lines.

/// Receives each rendered statement line.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Writes lines as `INFO` tracing events under the `sea_orm_statement_log` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, line: &str) {
        tracing::info!(target: "sea_orm_statement_log", "{}", line);
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn append(&self, line: &str) {
        self(line)
    }
}
