//! # Schema Reset
//!
//! Recreates the catalog tables from their declared shapes.
//!
//! ## How The Reset Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reset Process                                      │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ├── CREATE SCHEMA IF NOT EXISTS <first search_path entry>         │
//! │       │                                                                 │
//! │       ├── DROP TABLE product_variant CASCADE  (reverse order)           │
//! │       ├── DROP TABLE product CASCADE                                    │
//! │       │                                                                 │
//! │       ├── CREATE TABLE product                (declaration order)       │
//! │       ├── CREATE TABLE product_variant + indexes                        │
//! │       ▼                                                                 │
//! │  COMMIT  ── any failure rolls everything back → MigrationFailed         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a development-mode reset, not a versioned migration: every row
//! in the catalog tables is lost. Running it twice in a row is harmless.

use sqlx::PgPool;
use tracing::{debug, info};
use warehouse_core::{Product, ProductVariant};

use crate::error::{DbError, DbResult};
use crate::schema::{quote_ident, Model, TableDef};

/// The catalog tables, parents before children.
pub const CATALOG: &[TableDef] = &[Product::TABLE, ProductVariant::TABLE];

/// First schema named in a `search_path` value (`"a, b"` → `a`).
///
/// `$user` and quoted entries are skipped: they are not plain names we
/// can create. The name is lowercased, as the server folds unquoted
/// identifiers on the search_path (`Warehouse` resolves to `warehouse`).
pub fn primary_schema(search_path: &str) -> Option<String> {
    search_path
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty() && !s.starts_with('$') && !s.starts_with('"'))
        .map(str::to_lowercase)
}

fn migration_error(step: &str, err: sqlx::Error) -> DbError {
    DbError::MigrationFailed(format!("{}: {}", step, err))
}

/// Drops and recreates `tables` inside one transaction.
///
/// ## Arguments
/// * `search_path` - When set, its first schema is created if missing
/// * `tables` - Declared tables, parents before children
///
/// ## Errors
/// `DbError::MigrationFailed` on any DDL failure; nothing is applied.
pub async fn reset_models(
    pool: &PgPool,
    search_path: Option<&str>,
    tables: &[TableDef],
) -> DbResult<()> {
    info!(tables = tables.len(), "Resetting schema");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| migration_error("begin", e))?;

    if let Some(schema) = search_path.and_then(primary_schema) {
        let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&schema));
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_error(&format!("create schema {}", schema), e))?;
        debug!(schema = %schema, "Schema ensured");
    }

    for table in tables.iter().rev() {
        sqlx::query(&table.drop_table_sql())
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_error(&format!("drop table {}", table.name), e))?;
        debug!(table = %table.name, "Dropped table");
    }

    for table in tables {
        sqlx::query(&table.create_table_sql())
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_error(&format!("create table {}", table.name), e))?;

        for sql in table.create_index_sql() {
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| migration_error(&format!("create index on {}", table.name), e))?;
        }
        debug!(table = %table.name, "Created table");
    }

    tx.commit()
        .await
        .map_err(|e| migration_error("commit", e))?;

    info!("Schema reset complete");
    Ok(())
}

/// Returns `(declared, present)` table counts.
///
/// Tables are looked up in `current_schema()`, i.e. the first existing
/// schema on the connection's search_path.
pub async fn schema_status(pool: &PgPool, tables: &[TableDef]) -> DbResult<(usize, usize)> {
    let names: Vec<String> = tables.iter().map(|t| t.name.to_string()).collect();

    let present: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM information_schema.tables
        WHERE table_schema = current_schema()
          AND table_name::text = ANY($1)
        "#,
    )
    .bind(names)
    .fetch_one(pool)
    .await?;

    Ok((tables.len(), present as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_parents_first() {
        let names: Vec<&str> = CATALOG.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["product", "product_variant"]);
    }

    #[test]
    fn test_primary_schema() {
        assert_eq!(primary_schema("warehouse").as_deref(), Some("warehouse"));
        assert_eq!(primary_schema(" warehouse , public").as_deref(), Some("warehouse"));
        assert_eq!(primary_schema("$user, public").as_deref(), Some("public"));
        assert_eq!(primary_schema(""), None);
    }

    #[test]
    fn test_primary_schema_folds_case_like_the_server() {
        assert_eq!(primary_schema("Warehouse").as_deref(), Some("warehouse"));
        assert_eq!(primary_schema("\"Mixed\", Stock").as_deref(), Some("stock"));
    }
}
