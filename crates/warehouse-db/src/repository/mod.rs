//! # Repository Module
//!
//! Repositories for the catalog entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Demo scenario / tests                                                 │
//! │       │                                                                 │
//! │       │  db.products().get_with_variants(id)                           │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── insert(&self, new)                                                │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── get_with_variants(&self, id)                                      │
//! │  ├── update_omit_zero(&self, update)                                   │
//! │  └── count(&self)                                                      │
//! │                                                                         │
//! │  VariantRepository                                                     │
//! │  ├── insert(&self, new)                                                │
//! │  ├── insert_many(&self, batch)                                         │
//! │  ├── list_for_product(&self, product_id)                               │
//! │  ├── find(&self, filter)                                               │
//! │  └── count(&self, filter)                                              │
//! │       │                                                                 │
//! │       ▼  SQL (columns taken from schema::TableDef)                     │
//! │  PostgreSQL                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold a clone of the pool; creating one is cheap.

pub mod product;
pub mod variant;
