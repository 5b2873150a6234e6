//! # Warehouse Demo
//!
//! Connects to PostgreSQL, resets the catalog tables and walks through
//! insert, bulk insert, preload, filter and partial update.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()        RUST_LOG, default in init_tracing()          │
//! │  2. Settings::load()      defaults → warehouse.toml → env → .env       │
//! │  3. Database::connect()   one attempt; resets schema when configured   │
//! │  4. demo::run()           stops at the first error                     │
//! │  5. db.close()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod demo;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warehouse_db::Database;

use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting warehouse demo");

    let settings = Settings::load().context("loading settings")?;
    let db_config = settings.database.to_db_config()?;
    info!(database = ?db_config, "Configuration loaded");

    let db = Database::connect(db_config)
        .await
        .context("connecting to the database")?;

    let result = demo::run(&db).await;
    db.close().await;

    let report = result.context("demo run failed")?;
    info!(
        variants_inserted = report.variants_inserted,
        variants_preloaded = report.variants_preloaded,
        filter_matches = report.filter_matches,
        rows_updated = report.rows_updated,
        "Demo complete"
    );
    Ok(())
}

/// Initializes tracing/logging.
///
/// ## Log Levels
/// - Set via RUST_LOG environment variable
/// - Default: INFO, DEBUG for the warehouse crates and SQL statements,
///   WARN for the rest of sqlx
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,warehouse=debug,sqlx=warn,sqlx::query=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
