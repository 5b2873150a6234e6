//! # Product Variant Repository
//!
//! Database operations for product variants.
//!
//! ## Bulk Insert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How insert_many Works                                │
//! │                                                                         │
//! │  [red/X, green/M, green/L]                                             │
//! │       │                                                                 │
//! │       ▼  validate every row first (nothing sent on failure)            │
//! │  INSERT INTO product_variant (name, product_id, properties)            │
//! │  VALUES ($1, $2, $3), ($4, $5, $6), ($7, $8, $9)                       │
//! │  RETURNING id, name, product_id, properties, created_at, updated_at    │
//! │                                                                         │
//! │  PostgreSQL accepts at most 65535 bind parameters per statement.       │
//! │  Larger batches are split into chunks, all inside one transaction:     │
//! │  either every row is stored or none is.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;
use warehouse_core::{NewProductVariant, ProductVariant};

use crate::error::DbResult;
use crate::filter::VariantFilter;
use crate::schema::Model;

/// PostgreSQL's limit on bind parameters in one statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// Columns bound per inserted row.
const BINDS_PER_ROW: usize = 3;

/// Most rows a single multi-row INSERT can carry.
pub const MAX_ROWS_PER_STATEMENT: usize = MAX_BIND_PARAMS / BINDS_PER_ROW;

/// Repository for product variant database operations.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: PgPool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: PgPool) -> Self {
        VariantRepository { pool }
    }

    /// Inserts one variant.
    ///
    /// ## Errors
    /// * `DbError::InvalidInput` - bad name or property key
    /// * `DbError::ForeignKeyViolation` - `product_id` does not exist
    pub async fn insert(&self, variant: &NewProductVariant) -> DbResult<ProductVariant> {
        variant.validate()?;

        let sql = format!(
            "INSERT INTO {} (name, product_id, properties) VALUES ($1, $2, $3) RETURNING {}",
            ProductVariant::TABLE.name,
            ProductVariant::TABLE.select_list()
        );

        let stored = sqlx::query_as::<_, ProductVariant>(&sql)
            .bind(&variant.name)
            .bind(variant.product_id)
            .bind(Json(&variant.properties))
            .fetch_one(&self.pool)
            .await?;

        debug!(id = %stored.id, product_id = %stored.product_id, "Variant inserted");
        Ok(stored)
    }

    /// Inserts a batch of variants with multi-row INSERTs.
    ///
    /// ## Returns
    /// The stored rows, one per input, each with its own generated id.
    /// An empty batch returns an empty vec and sends nothing.
    ///
    /// ## Atomicity
    /// A failing row (e.g. an unknown `product_id`) aborts the whole batch.
    pub async fn insert_many(&self, variants: &[NewProductVariant]) -> DbResult<Vec<ProductVariant>> {
        if variants.is_empty() {
            return Ok(Vec::new());
        }

        for variant in variants {
            variant.validate()?;
        }

        debug!(count = variants.len(), "Bulk inserting variants");

        let stored = if variants.len() <= MAX_ROWS_PER_STATEMENT {
            // A single statement is atomic on its own
            let mut query = build_insert(variants);
            query
                .build_query_as::<ProductVariant>()
                .fetch_all(&self.pool)
                .await?
        } else {
            let mut tx = self.pool.begin().await?;
            let mut stored = Vec::with_capacity(variants.len());

            for chunk in variants.chunks(MAX_ROWS_PER_STATEMENT) {
                let mut query = build_insert(chunk);
                let rows = query
                    .build_query_as::<ProductVariant>()
                    .fetch_all(&mut *tx)
                    .await?;
                stored.extend(rows);
            }

            tx.commit().await?;
            stored
        };

        debug!(count = stored.len(), "Variants inserted");
        Ok(stored)
    }

    /// Every variant owned by `product_id`, in no particular order.
    pub async fn list_for_product(&self, product_id: Uuid) -> DbResult<Vec<ProductVariant>> {
        self.find(&VariantFilter::new().product_id_eq(product_id))
            .await
    }

    /// Variants matching every predicate of `filter`.
    ///
    /// Returned rows are standalone: they are not attached to a product.
    ///
    /// ## Errors
    /// `DbError::InvalidPredicate` when the filter holds a malformed
    /// property path; nothing is sent in that case.
    pub async fn find(&self, filter: &VariantFilter) -> DbResult<Vec<ProductVariant>> {
        let mut query = filter.select_query()?;

        if filter.touches_properties() {
            debug!("Property filter runs as a sequential scan");
        }

        let variants = query
            .build_query_as::<ProductVariant>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = variants.len(), "Variants matched filter");
        Ok(variants)
    }

    /// Number of variants matching `filter` (its limit is ignored).
    pub async fn count(&self, filter: &VariantFilter) -> DbResult<i64> {
        let mut query = filter.count_query()?;
        let count: i64 = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// One multi-row INSERT for `variants` (caller keeps it under the bind limit).
fn build_insert(variants: &[NewProductVariant]) -> QueryBuilder<'static, Postgres> {
    let table = ProductVariant::TABLE;
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} (name, product_id, properties) ",
        table.name
    ));

    qb.push_values(variants, |mut row, variant| {
        row.push_bind(variant.name.clone())
            .push_bind(variant.product_id)
            .push_bind(Json(variant.properties.clone()));
    });

    qb.push(" RETURNING ");
    qb.push(table.select_list());
    qb
}

// =============================================================================
// Unit Tests
// =============================================================================
