//! Basic example showing how to use sea-orm-statement-log.
//!
//! Run with: cargo run --example basic

use sea_orm::{ConnectionTrait, Database};
use sea_orm_statement_log::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,sea_orm_statement_log=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());

    // Settings usually come from a properties file loaded by the application
    let config = StatementLogConfig::from_properties([
        ("excludecategories", "commit,rollback"),
        ("commons.enable.dbunitstatement", "false"),
        ("commons.format", "#%cid %e[ms] %cat: %s"),
    ]);

    tracing::info!("Connecting to database...");

    let db = Database::connect(&database_url).await?;

    let app_db = db.with_statement_log_config(config);

    // Fixture loading goes through a handle tagged as DbUnit, so with
    // commons.enable.dbunitstatement=false its statements are not logged
    let fixture_db = app_db.clone().with_origin(Origin::DbUnit);

    fixture_db
        .execute_unprepared("CREATE TEMP TABLE demo (id INT)")
        .await?;
    app_db.execute_unprepared("SELECT * FROM demo").await?;

    Ok(())
}
