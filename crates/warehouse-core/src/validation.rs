//! # Validation Module
//!
//! Input validation for catalog entities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Rust types                                                   │
//! │  ├── NewProduct / NewProductVariant have no id or timestamps           │
//! │  └── Property values are a closed enum                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required / length checks on names                                 │
//! │  └── Property key checks                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key product_variant.product_id → product.id               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warehouse_core::validation::{validate_product_name, validate_brand};
//!
//! validate_product_name("Sport Hat").unwrap();
//! assert!(validate_brand("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::properties::Properties;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most `MAX_NAME_LENGTH` characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_label("name", name)
}

/// Validates a product brand. Same rules as the name.
pub fn validate_brand(brand: &str) -> ValidationResult<()> {
    validate_label("brand", brand)
}

/// Validates a variant name.
pub fn validate_variant_name(name: &str) -> ValidationResult<()> {
    validate_label("variant name", name)
}

// =============================================================================
// Property Validators
// =============================================================================

/// Validates a variant's property bag.
///
/// ## Rules
/// - Keys must not be empty or whitespace-only
/// - Values are unrestricted (any JSON shape)
pub fn validate_properties(properties: &Properties) -> ValidationResult<()> {
    if properties.keys().any(|k| k.trim().is_empty()) {
        return Err(ValidationError::InvalidFormat {
            field: "properties".to_string(),
            reason: "keys must not be empty".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
