//! # Error Types
//!
//! Domain-specific error types for warehouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warehouse-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  warehouse-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → anyhow (demo binary)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A variant was attached to a product it does not reference.
    ///
    /// ## When This Occurs
    /// - Preloading variants and a row with a different `product_id` slips in
    #[error("Variant {variant_id} belongs to product {found}, not {expected}")]
    VariantOwnerMismatch {
        variant_id: Uuid,
        expected: Uuid,
        found: Uuid,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed property path).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
