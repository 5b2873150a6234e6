//! # Schema Definitions
//!
//! Declarative table shapes for the catalog entities and the DDL rendered
//! from them.
//!
//! ## Declared Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product                                                                │
//! │  ├── id          uuid         PK  DEFAULT gen_random_uuid()             │
//! │  ├── name        text         NOT NULL                                  │
//! │  ├── brand       text         NOT NULL                                  │
//! │  ├── created_at  timestamptz  NOT NULL DEFAULT CURRENT_TIMESTAMP        │
//! │  └── updated_at  timestamptz  NULL                                      │
//! │                                                                         │
//! │  product_variant                                                        │
//! │  ├── id          uuid         PK  DEFAULT gen_random_uuid()             │
//! │  ├── name        text         NOT NULL                                  │
//! │  ├── product_id  uuid         NOT NULL → product(id) ON DELETE CASCADE  │
//! │  ├── properties  jsonb        NOT NULL DEFAULT '{}'                     │
//! │  ├── created_at  timestamptz  NOT NULL DEFAULT CURRENT_TIMESTAMP        │
//! │  └── updated_at  timestamptz  NULL                                      │
//! │      INDEX product_variant_product_id_idx (product_id)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `properties` deliberately has no GIN index: filters on it scan the table.
//!
//! The column list of each table is the single source for `SELECT` and
//! `RETURNING` clauses, so the declared shape and the `FromRow` structs in
//! `warehouse-core` must list the same names.

use warehouse_core::{Product, ProductVariant};

// =============================================================================
// Building Blocks
// =============================================================================

/// `ON DELETE` action for a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
    Restrict,
}

impl OnDelete {
    fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

/// A foreign key reference from one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

/// One column of a declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    /// Server-side default expression, inserted verbatim.
    pub default: Option<&'static str>,
    pub references: Option<ForeignKey>,
}

impl Column {
    /// A nullable column without default.
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Column {
            name,
            sql_type,
            nullable: true,
            primary_key: false,
            default: None,
            references: None,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Primary key (implies NOT NULL).
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub const fn default_expr(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub const fn references(
        mut self,
        table: &'static str,
        column: &'static str,
        on_delete: OnDelete,
    ) -> Self {
        self.references = Some(ForeignKey {
            table,
            column,
            on_delete,
        });
        self
    }

    /// True when the store fills this column if the insert omits it.
    pub const fn is_store_generated(&self) -> bool {
        self.default.is_some()
    }

    fn definition_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name), self.sql_type);
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

/// A secondary (non-unique) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// A declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Comma-separated column list for `SELECT` / `RETURNING`.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE IF NOT EXISTS ...` with primary and foreign keys.
    pub fn create_table_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::definition_sql).collect();

        let pk: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| quote_ident(c.name))
            .collect();
        if !pk.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", pk.join(", ")));
        }

        for column in self.columns {
            if let Some(fk) = column.references {
                parts.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
                    quote_ident(column.name),
                    quote_ident(fk.table),
                    quote_ident(fk.column),
                    fk.on_delete.as_sql()
                ));
            }
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quote_ident(self.name),
            parts.join(",\n    ")
        )
    }

    /// `DROP TABLE IF EXISTS ... CASCADE`.
    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(self.name))
    }

    /// One `CREATE INDEX IF NOT EXISTS` per declared index.
    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|idx| {
                let cols: Vec<String> = idx.columns.iter().map(|c| quote_ident(c)).collect();
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                    quote_ident(idx.name),
                    quote_ident(self.name),
                    cols.join(", ")
                )
            })
            .collect()
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// Models
// =============================================================================

/// An entity with a declared table.
pub trait Model {
    const TABLE: TableDef;
}

// TimestampColumns is embedded in every entity, so every table ends with these.
const CREATED_AT: Column = Column::new("created_at", "timestamptz")
    .not_null()
    .default_expr("CURRENT_TIMESTAMP");
const UPDATED_AT: Column = Column::new("updated_at", "timestamptz");

/// gen_random_uuid() is built in since PostgreSQL 13; no uuid-ossp needed.
const UUID_PK: Column = Column::new("id", "uuid")
    .primary_key()
    .default_expr("gen_random_uuid()");

impl Model for Product {
    const TABLE: TableDef = TableDef {
        name: "product",
        columns: &[
            UUID_PK,
            Column::new("name", "text").not_null(),
            Column::new("brand", "text").not_null(),
            CREATED_AT,
            UPDATED_AT,
        ],
        indexes: &[],
    };
}

impl Model for ProductVariant {
    const TABLE: TableDef = TableDef {
        name: "product_variant",
        columns: &[
            UUID_PK,
            Column::new("name", "text").not_null(),
            Column::new("product_id", "uuid")
                .not_null()
                .references("product", "id", OnDelete::Cascade),
            Column::new("properties", "jsonb")
                .not_null()
                .default_expr("'{}'::jsonb"),
            CREATED_AT,
            UPDATED_AT,
        ],
        indexes: &[IndexDef {
            name: "product_variant_product_id_idx",
            columns: &["product_id"],
        }],
    };
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_lists_match_entity_fields() {
        assert_eq!(
            Product::TABLE.select_list(),
            "id, name, brand, created_at, updated_at"
        );
        assert_eq!(
            ProductVariant::TABLE.select_list(),
            "id, name, product_id, properties, created_at, updated_at"
        );
    }

    #[test]
    fn test_product_ddl() {
        let sql = Product::TABLE.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"product\" ("));
        assert!(sql.contains("\"id\" uuid NOT NULL DEFAULT gen_random_uuid()"));
        assert!(sql.contains("\"created_at\" timestamptz NOT NULL DEFAULT CURRENT_TIMESTAMP"));
        assert!(sql.contains("\"updated_at\" timestamptz,"));
        assert!(sql.contains("PRIMARY KEY (\"id\")"));
        assert!(!sql.contains("FOREIGN KEY"));
    }

    #[test]
    fn test_variant_ddl_has_foreign_key_and_index() {
        let table = ProductVariant::TABLE;
        let sql = table.create_table_sql();
        assert!(sql.contains(
            "FOREIGN KEY (\"product_id\") REFERENCES \"product\" (\"id\") ON DELETE CASCADE"
        ));
        assert!(sql.contains("\"properties\" jsonb NOT NULL DEFAULT '{}'::jsonb"));

        assert_eq!(
            table.create_index_sql(),
            vec![
                "CREATE INDEX IF NOT EXISTS \"product_variant_product_id_idx\" \
                 ON \"product_variant\" (\"product_id\")"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_store_generated_columns() {
        let table = Product::TABLE;
        assert!(table.column("id").unwrap().is_store_generated());
        assert!(table.column("created_at").unwrap().is_store_generated());
        assert!(!table.column("updated_at").unwrap().is_store_generated());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_drop_and_quote() {
        assert_eq!(
            ProductVariant::TABLE.drop_table_sql(),
            "DROP TABLE IF EXISTS \"product_variant\" CASCADE"
        );
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
