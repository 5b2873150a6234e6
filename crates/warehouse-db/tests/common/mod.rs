//! Shared setup for the database-backed tests.
//!
//! The tests are ignored by default and run with `-- --ignored`; they then
//! require `WAREHOUSE_TEST_DATABASE_URL` and fail loudly without it. Each
//! test gets its own schema, so tests can run in parallel against the same
//! database.

use uuid::Uuid;
use warehouse_db::{Database, DbConfig};

pub const TEST_DATABASE_URL_VAR: &str = "WAREHOUSE_TEST_DATABASE_URL";

pub struct TestDb {
    pub db: Database,
    pub schema: String,
}

/// Connects with a fresh schema and freshly created tables.
pub async fn setup() -> TestDb {
    let url = std::env::var(TEST_DATABASE_URL_VAR).unwrap_or_else(|_| {
        panic!("{TEST_DATABASE_URL_VAR} must point at PostgreSQL to run the database tests")
    });

    let schema = format!("warehouse_test_{}", Uuid::new_v4().simple());

    let config = DbConfig::from_url(&url)
        .expect("test database url should parse")
        .search_path(schema.clone())
        .log_statements(false)
        .reset_schema(true);

    let db = Database::connect(config)
        .await
        .expect("test database should be reachable");

    TestDb { db, schema }
}

impl TestDb {
    /// Drops the per-test schema and closes the pool.
    pub async fn teardown(self) {
        let sql = format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", self.schema);
        sqlx::query(&sql)
            .execute(self.db.pool())
            .await
            .expect("test schema should drop");
        self.db.close().await;
    }
}
