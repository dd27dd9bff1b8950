//! # sea-orm-statement-log
//!
//! Category-filtered, template-formatted SQL statement logging for SeaORM.
//!
//! Every statement executed through a [`LoggedConnection`] is timed and handed
//! to a [`StatementFilter`], which decides from the configured category lists
//! and the statement's [`Origin`] whether to log it, and renders one line for
//! the parameterized form and one for the literal SQL.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sea_orm::Database;
//! use sea_orm_statement_log::LoggedConnection;
//!
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let logged = LoggedConnection::from(db);
//!
//! // Use it exactly like a normal DatabaseConnection
//! let users = Users::find().all(&logged).await?;
//! ```
//!
//! ## Configuration
//!
//! Either with the builder:
//!
//! ```rust,ignore
//! use sea_orm_statement_log::{StatementLogConfig, StatementLogExt};
//!
//! let config = StatementLogConfig::default()
//!     .with_excluded_categories(["commit", "rollback"])
//!     .with_sql_statements(false)
//!     .with_format("%cid|%e|%cat|%s");
//!
//! let logged = db.with_statement_log_config(config);
//! ```
//!
//! or from already-loaded properties:
//!
//! | Key | Effect | Default |
//! |-----|--------|---------|
//! | `excludecategories` | comma-separated categories never logged | empty |
//! | `includecategories` | comma-separated allow-list, when non-empty | empty |
//! | `commons.enable.preparedstatement` | log the parameterized form | `true` |
//! | `commons.enable.sqlstatement` | log the literal SQL form | `true` |
//! | `commons.enable.dbunitstatement` | log statements not issued by the application | `true` |
//! | `commons.format` | output template | `%e[ms] %s` |
//!
//! ## Template Placeholders
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `%cid` | connection id |
//! | `%e` | elapsed milliseconds |
//! | `%cat` | category (`statement`, `commit`, `rollback`) |
//! | `%s` | statement text |

mod config;
mod connection;
mod event;
mod filter;
mod format;
mod parser;
mod sink;

pub use config::{
    StatementLogConfig, DBUNIT_ENABLED_KEY, EXCLUDE_CATEGORIES_KEY, FORMAT_KEY,
    INCLUDE_CATEGORIES_KEY, PREPARED_ENABLED_KEY, SQL_ENABLED_KEY,
};
pub use connection::{LoggedConnection, StatementLogExt};
pub use event::{Origin, StatementEvent};
pub use filter::StatementFilter;
pub use format::{StatementFormat, DEFAULT_FORMAT};
pub use parser::{categorize, COMMIT_CATEGORY, ROLLBACK_CATEGORY, STATEMENT_CATEGORY};
pub use sink::{LogSink, TracingSink};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        LogSink, LoggedConnection, Origin, StatementFilter, StatementLogConfig, StatementLogExt,
    };
}
