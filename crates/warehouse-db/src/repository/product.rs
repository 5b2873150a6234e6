//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Insert with store-generated id and `created_at`
//! - Lookup by id, with or without the owned variants
//! - Omit-zero partial update
//!
//! ## Preloading Variants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 How get_with_variants Works                             │
//! │                                                                         │
//! │  get_with_variants(id)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM product WHERE id = $1           → none? NotFound       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM product_variant                                       │
//! │  WHERE product_id = $1                           → 0..n rows           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product.attach_variants(rows)                                         │
//! │                                                                         │
//! │  Two round-trips, no JOIN: the parent row is not repeated per child.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;
use warehouse_core::{NewProduct, Product, ProductUpdate};

use crate::error::{DbError, DbResult};
use crate::repository::variant::VariantRepository;
use crate::schema::Model;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let hat = repo.insert(&NewProduct::new("Sport Hat", "brand")).await?;
/// let loaded = repo.get_with_variants(hat.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: PgPool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns it as stored.
    ///
    /// ## Returns
    /// The product with its generated `id` and `created_at`; `variants`
    /// is empty.
    ///
    /// ## Errors
    /// * `DbError::InvalidInput` - name or brand rejected before the insert
    /// * `DbError::UniqueViolation` / other constraint errors from the store
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        product.validate()?;

        debug!(name = %product.name, brand = %product.brand, "Inserting product");

        let sql = format!(
            "INSERT INTO {} (name, brand) VALUES ($1, $2) RETURNING {}",
            Product::TABLE.name,
            Product::TABLE.select_list()
        );

        let stored = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(&product.brand)
            .fetch_one(&self.pool)
            .await?;

        debug!(id = %stored.id, "Product inserted");
        Ok(stored)
    }

    /// Gets a product by id, without its variants.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            Product::TABLE.select_list(),
            Product::TABLE.name
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product together with every variant it owns.
    ///
    /// A product without variants comes back with an empty `variants` vec.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no product has this id.
    pub async fn get_with_variants(&self, id: Uuid) -> DbResult<Product> {
        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let variants = VariantRepository::new(self.pool.clone())
            .list_for_product(id)
            .await?;

        debug!(id = %id, variants = variants.len(), "Preloaded product variants");

        product.attach_variants(variants)?;
        Ok(product)
    }

    /// Writes only the populated fields of `update`.
    ///
    /// ## Returns
    /// Number of rows changed: 1, or 0 when the id is unknown. An update
    /// with nothing set returns 0 without touching the database.
    ///
    /// `created_at` is never written.
    pub async fn update_omit_zero(&self, update: &ProductUpdate) -> DbResult<u64> {
        update.validate()?;

        let Some(mut query) = build_update(update) else {
            debug!(id = %update.id, "Empty update skipped");
            return Ok(0);
        };

        let result = query.build().execute(&self.pool).await?;

        debug!(
            id = %update.id,
            rows_affected = result.rows_affected(),
            "Product updated"
        );
        Ok(result.rows_affected())
    }

    /// Total number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", Product::TABLE.name);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

/// `UPDATE product SET <set fields> WHERE id = $n`, or `None` when no
/// field is set.
fn build_update(update: &ProductUpdate) -> Option<QueryBuilder<'static, Postgres>> {
    if update.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", Product::TABLE.name));

    {
        let mut set = qb.separated(", ");
        if let Some(name) = &update.name {
            set.push("name = ");
            set.push_bind_unseparated(name.clone());
        }
        if let Some(brand) = &update.brand {
            set.push("brand = ");
            set.push_bind_unseparated(brand.clone());
        }
        if let Some(updated_at) = update.updated_at {
            set.push("updated_at = ");
            set.push_bind_unseparated(updated_at);
        }
    }

    qb.push(" WHERE id = ");
    qb.push_bind(update.id);

    Some(qb)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_update_sets_only_populated_fields() {
        let update = ProductUpdate::new(Uuid::new_v4())
            .name("new name")
            .brand("new brand");

        let qb = build_update(&update).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE product SET name = $1, brand = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_update_single_field() {
        let update = ProductUpdate::new(Uuid::new_v4()).brand("new brand");
        let qb = build_update(&update).unwrap();
        assert_eq!(qb.sql(), "UPDATE product SET brand = $1 WHERE id = $2");
    }

    #[test]
    fn test_update_with_timestamp_never_touches_created_at() {
        let update = ProductUpdate::new(Uuid::new_v4())
            .name("n")
            .touched_at(Utc::now());

        let qb = build_update(&update).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE product SET name = $1, updated_at = $2 WHERE id = $3"
        );
        assert!(!qb.sql().contains("created_at"));
    }

    #[test]
    fn test_empty_update_builds_nothing() {
        assert!(build_update(&ProductUpdate::new(Uuid::new_v4())).is_none());
    }
}
