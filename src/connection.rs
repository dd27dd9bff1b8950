//! Logged database connection wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, StreamTrait, TransactionError,
    TransactionTrait,
};

use crate::config::StatementLogConfig;
use crate::event::{Origin, StatementEvent};
use crate::filter::StatementFilter;
use crate::parser::categorize;
use crate::sink::{LogSink, TracingSink};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Statement captured before execution, completed with its timing afterwards.
struct PendingStatement {
    category: &'static str,
    prepared: String,
    sql: String,
}

/// A logging wrapper around SeaORM's `DatabaseConnection`.
///
/// Implements `ConnectionTrait`, `StreamTrait`, and `TransactionTrait`, so it
/// can be used wherever a `DatabaseConnection` is. Every statement executed
/// through it is timed, run through a [`StatementFilter`], and the resulting
/// lines are written to a [`LogSink`] (tracing by default).
///
/// `transaction` and `transaction_with_config` log the closing `COMMIT` or
/// `ROLLBACK` under the `commit` and `rollback` categories. Statements issued on
/// the `DatabaseTransaction` itself, and transactions opened with `begin`, are
/// not intercepted.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use sea_orm_statement_log::{LoggedConnection, StatementLogConfig};
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let logged = LoggedConnection::new(db, StatementLogConfig::default());
///
/// // Logs "3[ms] SELECT ..." lines
/// let users = Users::find().all(&logged).await?;
/// ```
#[derive(Clone)]
pub struct LoggedConnection {
    inner: Arc<DatabaseConnection>,
    filter: StatementFilter,
    sink: Arc<dyn LogSink>,
    origin: Origin,
    connection_id: u64,
}

impl LoggedConnection {
    /// Create a new logged connection with the given configuration.
    pub fn new(connection: DatabaseConnection, config: StatementLogConfig) -> Self {
        Self {
            inner: Arc::new(connection),
            filter: StatementFilter::new(config),
            sink: Arc::new(TracingSink),
            origin: Origin::Application,
            connection_id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Create a new logged connection with default configuration.
    pub fn wrap(connection: DatabaseConnection) -> Self {
        Self::new(connection, StatementLogConfig::default())
    }

    /// Share a configuration with other connections.
    pub fn with_shared_config(mut self, config: Arc<StatementLogConfig>) -> Self {
        self.filter = StatementFilter::from_shared(config);
        self
    }

    /// Tag every statement issued through this handle with `origin`.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Send rendered lines to `sink` instead of tracing.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// Get the logging configuration.
    pub fn config(&self) -> &StatementLogConfig {
        self.filter.config()
    }

    /// Origin stamped on every statement issued through this handle.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Id shown for `%cid`. Clones share it.
    ///
    /// The id belongs to this wrapper, not to a physical connection: every
    /// pooled connection behind the wrapped `DatabaseConnection` logs the same id.
    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    ///
    /// Returns the wrapper unchanged while clones of it are still alive.
    pub fn into_inner(self) -> Result<DatabaseConnection, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Ok(inner),
            Err(inner) => Err(Self { inner, ..self }),
        }
    }

    /// Capture the texts of `stmt` if its category and origin would be logged.
    fn capture(&self, stmt: &Statement) -> Option<PendingStatement> {
        let category = categorize(&stmt.sql);
        if !self.filter.is_eligible(category, self.origin) {
            return None;
        }

        let has_values = stmt.values.as_ref().is_some_and(|v| !v.0.is_empty());
        let (prepared, sql) = if has_values {
            (stmt.sql.clone(), stmt.to_string())
        } else {
            (String::new(), stmt.sql.clone())
        };

        Some(PendingStatement {
            category,
            prepared,
            sql,
        })
    }

    /// Capture the commit or rollback that ends a transaction.
    fn capture_end<T, E>(&self, result: &Result<T, E>) -> Option<PendingStatement> {
        let sql = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        self.capture(&Statement::from_string(self.get_database_backend(), sql))
    }

    /// Complete a captured statement with its timing and emit it.
    fn log(&self, pending: Option<PendingStatement>, start: Instant) {
        let Some(pending) = pending else {
            return;
        };

        let event = StatementEvent {
            connection_id: self.connection_id,
            elapsed_ms: start.elapsed().as_millis() as u64,
            category: pending.category.to_string(),
            prepared: pending.prepared,
            sql: pending.sql,
            origin: self.origin,
        };

        self.filter.emit(&event, self.sink.as_ref());
    }
}

impl std::fmt::Debug for LoggedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggedConnection")
            .field("inner", &self.inner)
            .field("filter", &self.filter)
            .field("origin", &self.origin)
            .field("connection_id", &self.connection_id)
            .finish_non_exhaustive()
    }
}

impl From<DatabaseConnection> for LoggedConnection {
    fn from(connection: DatabaseConnection) -> Self {
        Self::wrap(connection)
    }
}

impl AsRef<DatabaseConnection> for LoggedConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

#[async_trait]
impl ConnectionTrait for LoggedConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        let pending = self.capture(&stmt);
        let start = Instant::now();

        let result = self.inner.execute(stmt).await;

        self.log(pending, start);
        result
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        let stmt = Statement::from_string(self.get_database_backend(), sql);
        let pending = self.capture(&stmt);
        let start = Instant::now();

        let result = self.inner.execute_unprepared(sql).await;

        self.log(pending, start);
        result
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        let pending = self.capture(&stmt);
        let start = Instant::now();

        let result = self.inner.query_one(stmt).await;

        self.log(pending, start);
        result
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        let pending = self.capture(&stmt);
        let start = Instant::now();

        let result = self.inner.query_all(stmt).await;

        self.log(pending, start);
        result
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

#[async_trait]
impl StreamTrait for LoggedConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        let pending = self.capture(&stmt);
        let start = Instant::now();

        Box::pin(async move {
            // Elapsed covers opening the stream, not draining it
            let result = self.inner.stream(stmt).await;
            self.log(pending, start);
            result
        })
    }
}

#[async_trait]
impl TransactionTrait for LoggedConnection {
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.inner.begin().await
    }

    async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DatabaseTransaction, DbErr> {
        self.inner
            .begin_with_config(isolation_level, access_mode)
            .await
    }

    async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        let start = Instant::now();

        let result = self.inner.transaction(callback).await;

        self.log(self.capture_end(&result), start);
        result
    }

    async fn transaction_with_config<F, T, E>(
        &self,
        callback: F,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        let start = Instant::now();

        let result = self
            .inner
            .transaction_with_config(callback, isolation_level, access_mode)
            .await;

        self.log(self.capture_end(&result), start);
        result
    }
}

/// Extension trait for easy wrapping of database connections.
pub trait StatementLogExt {
    /// Wrap this connection with default statement logging.
    fn with_statement_log(self) -> LoggedConnection;

    /// Wrap this connection with custom statement logging configuration.
    fn with_statement_log_config(self, config: StatementLogConfig) -> LoggedConnection;
}

impl StatementLogExt for DatabaseConnection {
    fn with_statement_log(self) -> LoggedConnection {
        LoggedConnection::wrap(self)
    }

    fn with_statement_log_config(self, config: StatementLogConfig) -> LoggedConnection {
        LoggedConnection::new(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn capture_sink() -> (Arc<dyn LogSink>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink: Arc<dyn LogSink> =
            Arc::new(move |line: &str| captured.lock().unwrap().push(line.to_string()));
        (sink, lines)
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn mock_exec(count: usize) -> DatabaseConnection {
        MockDatabase::new(DbBackend::Postgres)
            .append_exec_results((0..count).map(|_| exec_ok()))
            .into_connection()
    }

    #[tokio::test]
    async fn test_unprepared_statement_logs_sql_only() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(1)
            .with_statement_log_config(StatementLogConfig::default().with_format("%cat|%s"))
            .with_sink(sink);

        db.execute_unprepared("DELETE FROM sessions").await.unwrap();

        assert_eq!(*lines.lock().unwrap(), vec!["statement|DELETE FROM sessions"]);
    }

    #[tokio::test]
    async fn test_prepared_statement_logs_both_forms() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(1)
            .with_statement_log_config(StatementLogConfig::default().with_format("%s"))
            .with_sink(sink);

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE users SET name = $1 WHERE id = $2",
            [Value::from("bob"), Value::from(5i32)],
        );
        db.execute(stmt).await.unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "UPDATE users SET name = $1 WHERE id = $2");
        assert!(lines[1].contains("'bob'"));
        assert!(lines[1].contains("id = 5"));
    }

    #[tokio::test]
    async fn test_commit_category_can_be_excluded() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(2)
            .with_statement_log_config(
                StatementLogConfig::default()
                    .with_excluded_categories(["commit"])
                    .with_format("%cat|%s"),
            )
            .with_sink(sink);

        db.execute_unprepared("COMMIT").await.unwrap();
        db.execute_unprepared("INSERT INTO t VALUES (1)").await.unwrap();

        assert_eq!(
            *lines.lock().unwrap(),
            vec!["statement|INSERT INTO t VALUES (1)"]
        );
    }

    #[tokio::test]
    async fn test_dbunit_origin_suppressed() {
        let (sink, lines) = capture_sink();
        let config = Arc::new(StatementLogConfig::default().with_dbunit_statements(false));

        let fixtures = LoggedConnection::wrap(mock_exec(1))
            .with_shared_config(config.clone())
            .with_origin(Origin::DbUnit)
            .with_sink(sink.clone());
        let app = LoggedConnection::wrap(mock_exec(1))
            .with_shared_config(config)
            .with_sink(sink);

        fixtures
            .execute_unprepared("INSERT INTO users VALUES (1)")
            .await
            .unwrap();
        app.execute_unprepared("INSERT INTO users VALUES (2)")
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("INSERT INTO users VALUES (2)"));
    }

    #[tokio::test]
    async fn test_failed_statement_is_logged_and_error_returned() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(0)
            .with_statement_log_config(StatementLogConfig::default().with_format("%s"))
            .with_sink(sink);

        let result = db.execute_unprepared("DROP TABLE users").await;

        assert!(result.is_err());
        assert_eq!(*lines.lock().unwrap(), vec!["DROP TABLE users"]);
    }

    #[tokio::test]
    async fn test_query_all_logged() {
        let (sink, lines) = capture_sink();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([("id", Value::from(1i32))])]])
            .into_connection()
            .with_statement_log_config(StatementLogConfig::default().with_format("%cid %s"))
            .with_sink(sink);

        let rows = db
            .query_all(Statement::from_string(DbBackend::Postgres, "SELECT id FROM users"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            *lines.lock().unwrap(),
            vec![format!("{} SELECT id FROM users", db.connection_id())]
        );
    }

    #[tokio::test]
    async fn test_transaction_logs_commit() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(1)
            .with_statement_log_config(StatementLogConfig::default().with_format("%cat|%s"))
            .with_sink(sink);

        db.transaction::<_, (), DbErr>(|txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO t VALUES (1)").await?;
                Ok(())
            })
        })
        .await
        .unwrap();

        assert_eq!(*lines.lock().unwrap(), vec!["commit|COMMIT"]);
    }

    #[tokio::test]
    async fn test_failed_transaction_logs_rollback() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(0)
            .with_statement_log_config(StatementLogConfig::default().with_format("%cat|%s"))
            .with_sink(sink);

        let result = db
            .transaction::<_, (), DbErr>(|_txn| {
                Box::pin(async move { Err(DbErr::Custom("boom".to_owned())) })
            })
            .await;

        assert!(matches!(result, Err(TransactionError::Transaction(_))));
        assert_eq!(*lines.lock().unwrap(), vec!["rollback|ROLLBACK"]);
    }

    #[tokio::test]
    async fn test_excluded_commit_not_logged_for_transaction() {
        let (sink, lines) = capture_sink();
        let db = mock_exec(0)
            .with_statement_log_config(
                StatementLogConfig::default().with_excluded_categories(["commit"]),
            )
            .with_sink(sink);

        db.transaction_with_config::<_, (), DbErr>(
            |_txn| Box::pin(async move { Ok(()) }),
            None,
            None,
        )
        .await
        .unwrap();

        assert!(lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_one_logged() {
        let (sink, lines) = capture_sink();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([("id", Value::from(1i32))])]])
            .into_connection()
            .with_statement_log_config(StatementLogConfig::default().with_format("%cat|%s"))
            .with_sink(sink);

        let row = db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT id FROM users WHERE id = $1",
                [Value::from(1i32)],
            ))
            .await
            .unwrap();

        assert!(row.is_some());
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "statement|SELECT id FROM users WHERE id = $1");
        assert!(lines[1].ends_with("id = 1"));
    }

    #[tokio::test]
    async fn test_stream_logged_on_open() {
        let (sink, lines) = capture_sink();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([("id", Value::from(1i32))])]])
            .into_connection()
            .with_statement_log_config(StatementLogConfig::default().with_format("%cat|%s"))
            .with_sink(sink);

        let stream = db
            .stream(Statement::from_string(DbBackend::Postgres, "SELECT id FROM users"))
            .await;
        drop(stream);

        assert_eq!(
            *lines.lock().unwrap(),
            vec!["statement|SELECT id FROM users"]
        );
    }

    #[test]
    fn test_connection_ids() {
        let first = mock_exec(0).with_statement_log();
        let second = mock_exec(0).with_statement_log();

        assert_ne!(first.connection_id(), second.connection_id());
        assert_eq!(first.clone().connection_id(), first.connection_id());
    }

    #[test]
    fn test_into_inner_requires_sole_owner() {
        let db = mock_exec(0).with_statement_log();
        let clone = db.clone();

        let db = db.into_inner().unwrap_err();
        drop(clone);
        assert!(db.into_inner().is_ok());
    }

    #[test]
    fn test_wrapper_defaults() {
        let db = LoggedConnection::from(mock_exec(0));
        assert_eq!(db.origin(), Origin::Application);
        assert!(db.config().dbunit_enabled);
        assert!(db.is_mock_connection());
    }
}
