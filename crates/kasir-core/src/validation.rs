//! # Validation Module
//!
//! Input validation for Kasir.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP/JSON, external)                                 │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_cart: runs before any storage access                     │
//! │  └── product field checks for the admin path                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price_cents >= 0)                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CheckoutError, ValidationError};
use crate::types::{CartItem, NewProduct};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product name, in bytes.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

// =============================================================================
// Cart Validation
// =============================================================================

/// Validates a cart before the checkout transaction starts.
///
/// ## Rules
/// - Cart must not be empty
/// - Every quantity must be > 0 (first offender in cart order is reported)
/// - Duplicate product ids are allowed; they are separate lines
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_cart;
/// use kasir_core::CartItem;
///
/// assert!(validate_cart(&[CartItem::new(1, 2)]).is_ok());
/// assert!(validate_cart(&[CartItem::new(1, 0)]).is_err());
/// assert!(validate_cart(&[]).is_err());
/// ```
pub fn validate_cart(items: &[CartItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::Validation {
            product_id: None,
            reason: "cart is empty".to_string(),
        });
    }

    if let Some(bad) = items.iter().find(|item| item.quantity <= 0) {
        return Err(CheckoutError::invalid_item(
            bad.product_id,
            format!("quantity must be greater than zero, got {}", bad.quantity),
        ));
    }

    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_PRODUCT_NAME_LEN`] bytes
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level. Stock is never negative.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a restock amount.
pub fn validate_restock_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Runs every field check for a product about to be written.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_stock(product.stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cart_rejects_empty() {
        let err = validate_cart(&[]).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation { product_id: None, .. }));
    }

    #[test]
    fn test_validate_cart_reports_first_bad_quantity() {
        let cart = [
            CartItem::new(1, 2),
            CartItem::new(5, 0),
            CartItem::new(6, -3),
        ];
        let err = validate_cart(&cart).unwrap_err();
        assert_eq!(err.product_id(), Some(5));
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_validate_cart_allows_duplicates() {
        let cart = [CartItem::new(1, 2), CartItem::new(1, 3)];
        assert!(validate_cart(&cart).is_ok());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Indomie Goreng").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_restock_amount(1).is_ok());
        assert!(validate_restock_amount(0).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&NewProduct::new("Kopi", 500, 10)).is_ok());
        assert!(validate_new_product(&NewProduct::new("Kopi", 500, -1)).is_err());
    }
}
