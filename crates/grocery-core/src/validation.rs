//! # Validation Module
//!
//! Input validation utilities for the grocery POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (grocery-api)                                           │
//! │  ├── Typed request structs (serde)                                     │
//! │  └── Malformed JSON → VALIDATION_ERROR                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── Bills: non-empty lines, product codes, total >= 0                 │
//! │  └── Catalog & users: lengths, formats, non-negative prices            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (bill_id, product_code, email)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grocery_core::validation::{validate_bill, validate_product_code};
//! use grocery_core::{BillLine, Money};
//!
//! validate_product_code("RICE-5KG").unwrap();
//!
//! let lines = vec![BillLine::new("RICE-5KG")];
//! validate_bill(&lines, Money::from_cents(1250)).unwrap();
//! assert!(validate_bill(&[], Money::from_cents(1250)).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{BillLine, Quantity};
use crate::MAX_BILL_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens, underscores only (it ends up in URLs)
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("productCode"));
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "productCode".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "productCode",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a product name (1-200 characters after trimming).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("productName"));
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "productName".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items), negatives are not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity (zero or more).
pub fn validate_stock_quantity(qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::Negative {
            field: "productQty".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// User Validators
// =============================================================================

/// Validates an email address (loosely: something@something, max 254).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid_format(
            "email",
            "must look like name@example.com",
        )),
    }
}

/// Validates a password (at least 6 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

/// Validates a job role (1-50 characters).
pub fn validate_job_role(role: &str) -> ValidationResult<()> {
    let role = role.trim();

    if role.is_empty() {
        return Err(ValidationError::required("jobrole"));
    }

    if role.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "jobrole".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Bill Validators
// =============================================================================

/// Validates a checkout before it reaches the sequencer.
///
/// ## Rules
/// - At least one line, at most `MAX_BILL_LINES`
/// - Every line has a product code
/// - The total is not negative
///
/// ## User Workflow
/// ```text
/// Till presses "Save bill"
///      │
///      ▼
/// validate_bill(lines, total) ← THIS FUNCTION
///      │
///      ├── no lines?           → "items must contain at least one entry"
///      ├── blank product code? → "items[2].productCode is required"
///      ├── total < 0?          → "totalAmount must not be negative"
///      │
///      └── OK → sequencer mints the bill number
/// ```
pub fn validate_bill(lines: &[BillLine], total: Money) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_BILL_LINES {
        return Err(ValidationError::TooLong {
            field: "items".to_string(),
            max: MAX_BILL_LINES,
        });
    }

    for (index, line) in lines.iter().enumerate() {
        if line.product_code.trim().is_empty() {
            return Err(ValidationError::required(format!(
                "items[{}].productCode",
                index
            )));
        }
    }

    if total.is_negative() {
        return Err(ValidationError::Negative {
            field: "totalAmount".to_string(),
        });
    }

    Ok(())
}

/// Parses a bill date.
///
/// Accepts `YYYY-MM-DD` (what a date input produces) and full RFC 3339
/// timestamps, of which only the calendar date is kept.
pub fn parse_bill_date(raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required("date"));
    }

    let date_part = match raw.char_indices().nth(10) {
        Some((idx, 'T')) | Some((idx, ' ')) => &raw[..idx],
        _ => raw,
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD"))
}

// =============================================================================
// Unit Tests
// =============================================================================
