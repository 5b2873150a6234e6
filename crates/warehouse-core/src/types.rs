//! # Domain Types
//!
//! Entities persisted by the warehouse catalog and the shapes used to
//! create and update them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐  1     *  ┌─────────────────────────┐         │
//! │  │      Product        │◄─────────│     ProductVariant      │         │
//! │  │  ─────────────────  │          │  ─────────────────────  │         │
//! │  │  id (UUID, store)   │          │  id (UUID, store)       │         │
//! │  │  name               │          │  name                   │         │
//! │  │  brand              │          │  product_id (FK)        │         │
//! │  │  variants (preload) │          │  properties (jsonb)     │         │
//! │  │  timestamps ────────┼──┐    ┌──┼─ timestamps             │         │
//! │  └─────────────────────┘  │    │  └─────────────────────────┘         │
//! │                           ▼    ▼                                        │
//! │                   ┌──────────────────────┐                              │
//! │                   │   TimestampColumns   │  (embedded, not inherited)   │
//! │                   │  created_at (store)  │                              │
//! │                   │  updated_at (null)   │                              │
//! │                   └──────────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Store-Populated Fields
//! `id` and `created_at` are produced by the database (`gen_random_uuid()`,
//! `CURRENT_TIMESTAMP`) and come back through `RETURNING`. The insert shapes
//! ([`NewProduct`], [`NewProductVariant`]) therefore have no such fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::properties::{Properties, PropertyValue};
use crate::validation::{
    validate_brand, validate_product_name, validate_properties, validate_variant_name,
    ValidationResult,
};

// =============================================================================
// Timestamp Columns
// =============================================================================

/// Creation/modification timestamps shared by every entity.
///
/// `updated_at` is never maintained automatically; it only changes when an
/// update explicitly sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TimestampColumns {
    /// When the row was inserted (store default).
    pub created_at: DateTime<Utc>,

    /// Last explicit modification, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimestampColumns {
    /// Timestamps for a row created at `created_at` and never updated.
    pub fn created(created_at: DateTime<Utc>) -> Self {
        TimestampColumns {
            created_at,
            updated_at: None,
        }
    }

    /// The most recent of the two timestamps.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID, generated by the store).
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Brand / manufacturer.
    pub brand: String,

    /// Variants owned by this product.
    ///
    /// Not a column: only filled by the preloading select, empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub variants: Vec<ProductVariant>,

    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub timestamps: TimestampColumns,
}

impl Product {
    /// Creation time, read through the embedded timestamps.
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    /// Replaces the owned variants.
    ///
    /// ## Errors
    /// `CoreError::VariantOwnerMismatch` if any variant references
    /// another product; the product is left untouched in that case.
    pub fn attach_variants(&mut self, variants: Vec<ProductVariant>) -> CoreResult<()> {
        if let Some(stray) = variants.iter().find(|v| v.product_id != self.id) {
            return Err(CoreError::VariantOwnerMismatch {
                variant_id: stray.id,
                expected: self.id,
                found: stray.product_id,
            });
        }

        self.variants = variants;
        Ok(())
    }

    /// Finds a loaded variant by name.
    pub fn variant_named(&self, name: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A concrete variation of a product (e.g. "green, size L").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductVariant {
    /// Unique identifier (UUID, generated by the store).
    pub id: Uuid,

    /// Variant label.
    pub name: String,

    /// Owning product (foreign key, not null).
    pub product_id: Uuid,

    /// Free-form attributes, stored as `jsonb`.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub properties: Properties,

    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub timestamps: TimestampColumns,
}

impl ProductVariant {
    /// Shortcut for `properties.get(key)`.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

// =============================================================================
// Insert Shapes
// =============================================================================

/// A product that has not been stored yet (no id, no timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        NewProduct {
            name: name.into(),
            brand: brand.into(),
        }
    }

    /// Checks name and brand before the insert is attempted.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_brand(&self.brand)?;
        Ok(())
    }
}

/// A variant that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductVariant {
    pub name: String,
    pub product_id: Uuid,
    #[serde(default)]
    pub properties: Properties,
}

impl NewProductVariant {
    pub fn new(name: impl Into<String>, product_id: Uuid) -> Self {
        NewProductVariant {
            name: name.into(),
            product_id,
            properties: Properties::new(),
        }
    }

    /// Builder-style property setter.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Replaces all properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_variant_name(&self.name)?;
        validate_properties(&self.properties)?;
        Ok(())
    }
}

// =============================================================================
// Partial Update Shape
// =============================================================================

/// A partial product update: only `Some` fields are written.
///
/// ## Omit-Zero Semantics
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product { id, name: "new name", brand: "new brand", created_at: ? }   │
/// │       │                                                                 │
/// │       ▼  ProductUpdate::omit_zero                                       │
/// │  ProductUpdate { id, name: Some, brand: Some, updated_at: None }       │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  UPDATE product SET name = $1, brand = $2 WHERE id = $3                │
/// │                                                                         │
/// │  created_at is never part of an update; it is set once at insert.      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub id: Uuid,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductUpdate {
    /// An update touching nothing yet.
    pub fn new(id: Uuid) -> Self {
        ProductUpdate {
            id,
            name: None,
            brand: None,
            updated_at: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Sets `updated_at` explicitly (the store never does it on its own).
    pub fn touched_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Builds an update from an in-memory product, skipping zero values.
    ///
    /// Empty strings count as "not set"; `updated_at` is carried over only
    /// when present.
    pub fn omit_zero(product: &Product) -> Self {
        ProductUpdate {
            id: product.id,
            name: Some(product.name.clone()).filter(|s| !s.is_empty()),
            brand: Some(product.brand.clone()).filter(|s| !s.is_empty()),
            updated_at: product.timestamps.updated_at,
        }
    }

    /// True when no column would be written.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.brand.is_none() && self.updated_at.is_none()
    }

    /// Validates only the fields being set.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(brand) = &self.brand {
            validate_brand(brand)?;
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
    use chrono::TimeZone;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Sport Hat".to_string(),
            brand: "brand".to_string(),
            variants: Vec::new(),
            timestamps: TimestampColumns::created(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            ),
        }
    }

    fn variant_of(product_id: Uuid, name: &str) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            product_id,
            properties: Properties::new().with("color", name),
            timestamps: TimestampColumns::created(Utc::now()),
        }
    }

    #[test]
    fn test_attach_variants() {
        let mut product = sample_product();
        let variants = vec![variant_of(product.id, "red"), variant_of(product.id, "green")];

        product.attach_variants(variants).unwrap();
        assert_eq!(product.variants.len(), 2);
        assert!(product.variant_named("green").is_some());
    }

    #[test]
    fn test_attach_variants_rejects_foreign_rows() {
        let mut product = sample_product();
        let stray = variant_of(Uuid::new_v4(), "blue");

        let err = product.attach_variants(vec![stray]).unwrap_err();
        assert!(matches!(err, CoreError::VariantOwnerMismatch { .. }));
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_omit_zero_skips_empty_strings() {
        let mut product = sample_product();
        product.name = "new name".to_string();
        product.brand = String::new();

        let update = ProductUpdate::omit_zero(&product);
        assert_eq!(update.id, product.id);
        assert_eq!(update.name.as_deref(), Some("new name"));
        assert_eq!(update.brand, None);
        assert_eq!(update.updated_at, None);
    }

    #[test]
    fn test_empty_update() {
        let id = Uuid::new_v4();
        assert!(ProductUpdate::new(id).is_empty());
        assert!(!ProductUpdate::new(id).brand("x").is_empty());
        assert!(!ProductUpdate::new(id).touched_at(Utc::now()).is_empty());
    }

    #[test]
    fn test_update_validates_only_set_fields() {
        let id = Uuid::new_v4();
        assert!(ProductUpdate::new(id).validate().is_ok());
        assert!(ProductUpdate::new(id).name("").validate().is_err());
        assert!(ProductUpdate::new(id).brand("ok").validate().is_ok());
    }

    #[test]
    fn test_last_modified() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let mut ts = TimestampColumns::created(created);
        assert_eq!(ts.last_modified(), created);

        ts.updated_at = Some(updated);
        assert_eq!(ts.last_modified(), updated);
    }

    #[test]
    fn test_product_json_flattens_timestamps() {
        let product = sample_product();
        let value = serde_json::to_value(&product).unwrap();

        assert!(value.get("created_at").is_some());
        assert!(value.get("timestamps").is_none());
        // Unloaded variants are left out entirely
        assert!(value.get("variants").is_none());
    }

    #[test]
    fn test_new_variant_builder() {
        let product_id = Uuid::new_v4();
        let variant = NewProductVariant::new("green", product_id)
            .property("color", "green")
            .property("size", "M");

        assert_eq!(variant.product_id, product_id);
        assert_eq!(variant.properties.len(), 2);
        assert!(variant.validate().is_ok());
    }
}
