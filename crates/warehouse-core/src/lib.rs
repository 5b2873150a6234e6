//! # warehouse-core: Pure Domain Types for the Warehouse Catalog
//!
//! This crate holds the product/variant model shared by the database layer
//! and the demo binary. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Warehouse Catalog Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/warehouse-demo                          │   │
//! │  │    insert ──► bulk insert ──► preload ──► filter ──► update     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ warehouse-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌──────────────┐  ┌──────────────┐           │   │
//! │  │   │   types    │  │  properties  │  │  validation  │           │   │
//! │  │   │  Product   │  │ PropertyValue│  │    rules     │           │   │
//! │  │   │  Variant   │  │  Properties  │  │    checks    │           │   │
//! │  │   └────────────┘  └──────────────┘  └──────────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 warehouse-db (Database Layer)                   │   │
//! │  │          PostgreSQL schema reset, repositories, filters         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (`Product`, `ProductVariant`) and their insert/update shapes
//! - [`properties`] - The semi-structured `Properties` mapping and its value type
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use warehouse_core::{NewProductVariant, PropertyValue};
//! use uuid::Uuid;
//!
//! let variant = NewProductVariant::new("green", Uuid::new_v4())
//!     .property("color", "green")
//!     .property("size", "L");
//!
//! assert_eq!(
//!     variant.properties.get("size"),
//!     Some(&PropertyValue::from("L"))
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod properties;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use properties::{Properties, PropertyPath, PropertyValue};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product, brand or variant name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum depth of a property path (`dims.width` has depth 2).
pub const MAX_PROPERTY_PATH_DEPTH: usize = 8;
