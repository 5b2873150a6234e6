//! # Variant Filters
//!
//! Builds the `WHERE` clause for filtered variant selects.
//!
//! ## Predicate Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VariantFilter::new()                                                   │
//! │      .name_eq("green")               →  name = $1                       │
//! │      .property_like("size", "L")     →  properties #>> $2 LIKE $3       │
//! │      .has_property("dims.width")     →  properties #> $4 IS NOT NULL    │
//! │      .limit(10)                      →  LIMIT $5                        │
//! │                                                                         │
//! │  All predicates are AND-ed. Every value and every path is a bound      │
//! │  parameter; only column names from `VariantColumn` are spliced in.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Performance
//! Property predicates are NOT index-backed: PostgreSQL extracts the path
//! from every row's `jsonb` and compares it (a sequential scan). Fine for a
//! catalog of demo size. Hot keys would need an expression index or a
//! GIN index with containment (`@>`) predicates.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;
use warehouse_core::{ProductVariant, PropertyPath, PropertyValue};

use crate::error::{DbError, DbResult};
use crate::schema::Model;

// =============================================================================
// Predicate Parts
// =============================================================================

/// Scalar columns of `product_variant` that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantColumn {
    Id,
    Name,
    ProductId,
}

impl VariantColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantColumn::Id => "id",
            VariantColumn::Name => "name",
            VariantColumn::ProductId => "product_id",
        }
    }
}

/// How a value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// Exact equality.
    Eq,
    /// SQL `LIKE` pattern (`%` and `_` wildcards).
    Like,
}

impl MatchOp {
    fn as_sql(&self) -> &'static str {
        match self {
            MatchOp::Eq => " = ",
            MatchOp::Like => " LIKE ",
        }
    }
}

/// A value compared against a scalar column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Text(String),
    Uuid(Uuid),
}

/// One condition of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `<column> = $n` / `<column> LIKE $n`
    Column {
        column: VariantColumn,
        op: MatchOp,
        value: ScalarValue,
    },

    /// `properties #>> $path = $n` / `LIKE $n`
    ///
    /// `value: None` means the path is absent or JSON null
    /// (`properties #>> $path IS NULL`).
    Property {
        path: PropertyPath,
        op: MatchOp,
        value: Option<String>,
    },

    /// `properties #> $path IS NOT NULL`
    HasProperty { path: PropertyPath },
}

// =============================================================================
// Filter
// =============================================================================

/// A filter over `product_variant` rows.
///
/// ## Example
/// ```rust
/// use warehouse_db::VariantFilter;
///
/// let filter = VariantFilter::new()
///     .name_eq("green")
///     .property_like("size", "L");
///
/// assert_eq!(filter.predicates().len(), 2);
/// ```
///
/// Builder methods never fail; a malformed property path is remembered
/// and reported as `DbError::InvalidPredicate` when the query is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantFilter {
    predicates: Vec<Predicate>,
    limit: Option<u32>,
    invalid: Option<String>,
}

impl VariantFilter {
    /// Matches every row.
    pub fn new() -> Self {
        VariantFilter::default()
    }

    pub fn id_eq(self, id: Uuid) -> Self {
        self.column(VariantColumn::Id, MatchOp::Eq, ScalarValue::Uuid(id))
    }

    pub fn name_eq(self, name: impl Into<String>) -> Self {
        self.column(VariantColumn::Name, MatchOp::Eq, ScalarValue::Text(name.into()))
    }

    pub fn name_like(self, pattern: impl Into<String>) -> Self {
        self.column(
            VariantColumn::Name,
            MatchOp::Like,
            ScalarValue::Text(pattern.into()),
        )
    }

    pub fn product_id_eq(self, product_id: Uuid) -> Self {
        self.column(
            VariantColumn::ProductId,
            MatchOp::Eq,
            ScalarValue::Uuid(product_id),
        )
    }

    /// Adds a raw column predicate.
    pub fn column(mut self, column: VariantColumn, op: MatchOp, value: ScalarValue) -> Self {
        if op == MatchOp::Like && matches!(value, ScalarValue::Uuid(_)) {
            self.reject(format!("LIKE is not supported on uuid column {}", column.as_str()));
            return self;
        }
        self.predicates.push(Predicate::Column { column, op, value });
        self
    }

    /// Property at `path` equals `value`.
    ///
    /// The comparison is textual, as with PostgreSQL's `#>>`: `"L"` matches
    /// the JSON string `"L"`, `42` matches the number `42`, and a `Null`
    /// value matches rows where the path is missing or null.
    pub fn property_eq(self, path: &str, value: impl Into<PropertyValue>) -> Self {
        let text = value.into().to_text();
        self.property(path, MatchOp::Eq, text)
    }

    /// Property at `path`, as text, matches the `LIKE` pattern.
    pub fn property_like(self, path: &str, pattern: impl Into<String>) -> Self {
        self.property(path, MatchOp::Like, Some(pattern.into()))
    }

    /// Property at `path` is present (JSON null counts as present).
    pub fn has_property(mut self, path: &str) -> Self {
        match path.parse::<PropertyPath>() {
            Ok(path) => self.predicates.push(Predicate::HasProperty { path }),
            Err(e) => self.reject(e.to_string()),
        }
        self
    }

    fn property(mut self, path: &str, op: MatchOp, value: Option<String>) -> Self {
        if value.is_none() && op == MatchOp::Like {
            self.reject("LIKE needs a pattern".to_string());
            return self;
        }
        match path.parse::<PropertyPath>() {
            Ok(path) => self.predicates.push(Predicate::Property { path, op, value }),
            Err(e) => self.reject(e.to_string()),
        }
        self
    }

    /// Caps the number of returned rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn reject(&mut self, reason: String) {
        // first problem wins
        self.invalid.get_or_insert(reason);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when any predicate reaches into `properties` (full scan).
    pub fn touches_properties(&self) -> bool {
        self.predicates
            .iter()
            .any(|p| !matches!(p, Predicate::Column { .. }))
    }

    // =========================================================================
    // SQL Rendering
    // =========================================================================

    /// `SELECT <columns> FROM product_variant WHERE ... [LIMIT n]`
    pub fn select_query(&self) -> DbResult<QueryBuilder<'static, Postgres>> {
        let table = ProductVariant::TABLE;
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            table.select_list(),
            table.name
        ));
        self.push_where(&mut qb)?;
        if let Some(limit) = self.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }
        Ok(qb)
    }

    /// `SELECT COUNT(*) FROM product_variant WHERE ...` (limit ignored).
    pub fn count_query(&self) -> DbResult<QueryBuilder<'static, Postgres>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM {}",
            ProductVariant::TABLE.name
        ));
        self.push_where(&mut qb)?;
        Ok(qb)
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) -> DbResult<()> {
        if let Some(reason) = &self.invalid {
            return Err(DbError::InvalidPredicate(reason.clone()));
        }

        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });

            match predicate {
                Predicate::Column { column, op, value } => {
                    qb.push(column.as_str());
                    qb.push(op.as_sql());
                    match value {
                        ScalarValue::Text(text) => qb.push_bind(text.clone()),
                        ScalarValue::Uuid(id) => qb.push_bind(*id),
                    };
                }
                Predicate::Property { path, op, value } => {
                    qb.push("properties #>> ");
                    qb.push_bind(path.segments().to_vec());
                    match value {
                        Some(value) => {
                            qb.push(op.as_sql());
                            qb.push_bind(value.clone());
                        }
                        None => {
                            qb.push(" IS NULL");
                        }
                    }
                }
                Predicate::HasProperty { path } => {
                    qb.push("properties #> ");
                    qb.push_bind(path.segments().to_vec());
                    qb.push(" IS NOT NULL");
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: &str =
        "SELECT id, name, product_id, properties, created_at, updated_at FROM product_variant";

    #[test]
    fn test_empty_filter_selects_everything() {
        let qb = VariantFilter::new().select_query().unwrap();
        assert_eq!(qb.sql(), SELECT);
    }

    #[test]
    fn test_name_and_property_pattern() {
        let filter = VariantFilter::new()
            .name_eq("green")
            .property_like("size", "L");

        let qb = filter.select_query().unwrap();
        assert_eq!(
            qb.sql(),
            format!("{SELECT} WHERE name = $1 AND properties #>> $2 LIKE $3")
        );
        assert!(filter.touches_properties());
    }

    #[test]
    fn test_nested_path_and_null_and_limit() {
        let filter = VariantFilter::new()
            .property_eq("dims.width", 30)
            .property_eq("discontinued", PropertyValue::Null)
            .has_property("color")
            .limit(5);

        let qb = filter.select_query().unwrap();
        assert_eq!(
            qb.sql(),
            format!(
                "{SELECT} WHERE properties #>> $1 = $2 AND properties #>> $3 IS NULL \
                 AND properties #> $4 IS NOT NULL LIMIT $5"
            )
        );

        match &filter.predicates()[0] {
            Predicate::Property { path, value, .. } => {
                assert_eq!(path.depth(), 2);
                assert_eq!(value.as_deref(), Some("30"));
            }
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn test_count_query_ignores_limit() {
        let product_id = Uuid::new_v4();
        let qb = VariantFilter::new()
            .product_id_eq(product_id)
            .limit(1)
            .count_query()
            .unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM product_variant WHERE product_id = $1"
        );
    }

    #[test]
    fn test_scalar_filters_do_not_touch_properties() {
        let filter = VariantFilter::new().name_like("gr%").id_eq(Uuid::nil());
        assert!(!filter.touches_properties());
    }

    #[test]
    fn test_malformed_predicates_are_reported() {
        let bad_path = VariantFilter::new().name_eq("green").property_eq("size..x", "L");
        assert!(matches!(
            bad_path.select_query(),
            Err(DbError::InvalidPredicate(_))
        ));

        let empty_path = VariantFilter::new().has_property("");
        assert!(matches!(
            empty_path.count_query(),
            Err(DbError::InvalidPredicate(_))
        ));

        let uuid_like = VariantFilter::new().column(
            VariantColumn::ProductId,
            MatchOp::Like,
            ScalarValue::Uuid(Uuid::nil()),
        );
        assert!(uuid_like.select_query().is_err());

        let null_like = VariantFilter::new().property("size", MatchOp::Like, None);
        assert!(null_like.select_query().is_err());
    }
}
