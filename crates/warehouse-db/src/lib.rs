//! # warehouse-db: Database Layer for the Warehouse Catalog
//!
//! PostgreSQL access for products and their variants, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Warehouse Data Flow                                │
//! │                                                                         │
//! │  warehouse-demo (scenario runner)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  warehouse-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Schema      │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs)  │    │  (schema.rs) │  │   │
//! │  │   │               │    │ (variant.rs)  │    │              │  │   │
//! │  │   │ PgPool        │◄───│               │    │ TableDef     │  │   │
//! │  │   │ DbConfig/DSN  │    │ VariantFilter │    │ reset_models │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL                                  │   │
//! │  │   product, product_variant (in the configured search_path)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection configuration, DSN parsing and the pool handle
//! - [`schema`] - Declared tables and the DDL rendered from them
//! - [`migrations`] - Destructive schema reset
//! - [`filter`] - Predicate builder for variant selects
//! - [`repository`] - Product and variant repositories
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warehouse_core::NewProduct;
//! use warehouse_db::{Database, DbConfig};
//!
//! let config = DbConfig::from_url("postgres://postgres@localhost/warehouse?sslmode=disable")?
//!     .reset_schema(true);
//! let db = Database::connect(config).await?;
//!
//! let hat = db.products().insert(&NewProduct::new("Sport Hat", "brand")).await?;
//! let loaded = db.products().get_with_variants(hat.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorClass};
pub use filter::{MatchOp, Predicate, ScalarValue, VariantColumn, VariantFilter};
pub use pool::{Database, DbConfig, SslMode};
pub use schema::{Model, TableDef};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::variant::VariantRepository;
