//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CheckoutError    - Closed set of checkout outcomes                │
//! │  └── ValidationError  - Field validation failures (product admin)      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: DbError ──(Busy/PoolExhausted)──► CheckoutError::Timeout        │
//! │        DbError ──(anything else)───────► CheckoutError::Internal       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! `CheckoutError` serializes with a `kind` tag so callers branch on the kind
//! instead of parsing the message:
//! ```json
//! { "kind": "insufficient_stock", "product_id": 2, "available": 3, "requested": 5 }
//! ```

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Every way a checkout can fail.
///
/// Whatever the variant, the checkout transaction has been rolled back and
/// storage is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutError {
    /// The cart itself is malformed (empty, quantity ≤ 0, amount overflow).
    ///
    /// Raised before any storage access.
    #[error("Invalid cart{}: {reason}", fmt_product(.product_id))]
    Validation {
        product_id: Option<i64>,
        reason: String,
    },

    /// The cart references a product id that does not exist.
    #[error("Product not found: {product_id}")]
    NotFound { product_id: i64 },

    /// Not enough stock under lock.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{A, 5}, {B, 1000}]
    ///      │
    ///      ▼
    /// Lock A, lock B (ascending id)
    ///      │
    ///      ▼
    /// A ok (stock 10) ─► B: available=40 < requested=1000
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: B, available: 40, requested: 1000 }
    /// Rollback: A still 10, no order written
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Lock wait or the whole checkout exceeded its deadline.
    #[error("Checkout timed out waiting for stock locks")]
    Timeout,

    /// Storage failure unrelated to business rules.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CheckoutError {
    /// Creates a Validation error for a specific cart line.
    pub fn invalid_item(product_id: i64, reason: impl Into<String>) -> Self {
        CheckoutError::Validation {
            product_id: Some(product_id),
            reason: reason.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CheckoutError::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable tag, identical to the serialized `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Validation { .. } => "validation",
            CheckoutError::NotFound { .. } => "not_found",
            CheckoutError::InsufficientStock { .. } => "insufficient_stock",
            CheckoutError::Timeout => "timeout",
            CheckoutError::Internal { .. } => "internal",
        }
    }

    /// The offending product, where the failure is tied to one.
    pub fn product_id(&self) -> Option<i64> {
        match self {
            CheckoutError::Validation { product_id, .. } => *product_id,
            CheckoutError::NotFound { product_id }
            | CheckoutError::InsufficientStock { product_id, .. } => Some(*product_id),
            CheckoutError::Timeout | CheckoutError::Internal { .. } => None,
        }
    }
}

fn fmt_product(product_id: &Option<i64>) -> String {
    match product_id {
        Some(id) => format!(" (product {id})"),
        None => String::new(),
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used by the administrative product path before rows are written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::InsufficientStock {
            product_id: 2,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 2: available 3, requested 5"
        );

        let err = CheckoutError::invalid_item(9, "quantity must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid cart (product 9): quantity must be greater than zero"
        );

        let err = CheckoutError::Validation {
            product_id: None,
            reason: "cart is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid cart: cart is empty");
    }

    #[test]
    fn test_serialized_kind_tag() {
        let err = CheckoutError::InsufficientStock {
            product_id: 2,
            available: 3,
            requested: 5,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "insufficient_stock",
                "product_id": 2,
                "available": 3,
                "requested": 5
            })
        );

        let json = serde_json::to_value(CheckoutError::Timeout).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "timeout" }));
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let errors = [
            CheckoutError::invalid_item(1, "bad"),
            CheckoutError::NotFound { product_id: 1 },
            CheckoutError::InsufficientStock {
                product_id: 1,
                available: 0,
                requested: 1,
            },
            CheckoutError::Timeout,
            CheckoutError::internal("disk full"),
        ];

        for err in errors {
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["kind"], err.kind());
        }
    }

    #[test]
    fn test_product_id_accessor() {
        assert_eq!(CheckoutError::NotFound { product_id: 4 }.product_id(), Some(4));
        assert_eq!(CheckoutError::Timeout.product_id(), None);
        assert_eq!(CheckoutError::internal("x").product_id(), None);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }
}
