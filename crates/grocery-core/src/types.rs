//! # Domain Types
//!
//! Core domain types used throughout the grocery POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   DailyBill     │   │  BillCounter    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_code   │   │  id (rowid)     │   │  prefix (YYMM)  │       │
//! │  │  product_name   │   │  bill_id        │   │  last_number    │       │
//! │  │  unit_price     │   │  product_codes  │   └─────────────────┘       │
//! │  │  stock_qty      │   │  total_cents    │                             │
//! │  └─────────────────┘   └─────────────────┘   ┌─────────────────┐       │
//! │                                              │      User       │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  ─────────────  │       │
//! │  │    Quantity     │   │    BillLine     │   │  email          │       │
//! │  │  hundredths     │   │  product_code   │   │  password_hash  │       │
//! │  │  (2.50 kg)      │   │                 │   │  job_role       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - Products are keyed by their business code (`product_code`)
//! - Bills carry a surrogate `id` and the human-readable `bill_id`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::billing::BillNumber;
use crate::error::{CoreResult, ValidationError};
use crate::money::{format_fixed2, parse_fixed2, Money};

// =============================================================================
// Quantity
// =============================================================================

/// Stock or sold quantity with two decimals (loose goods sold by weight).
///
/// Stored as hundredths: `2.50` kg is `Quantity(250)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths of a unit.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Returns the quantity in hundredths of a unit.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses a decimal quantity, naming `field` in the error.
    pub fn parse_field(field: &str, s: &str) -> Result<Self, ValidationError> {
        parse_fixed2(field, s).map(Quantity)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed2(self.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

impl From<i64> for Quantity {
    fn from(hundredths: i64) -> Self {
        Quantity(hundredths)
    }
}

impl From<Quantity> for i64 {
    fn from(qty: Quantity) -> Self {
        qty.0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the store catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Business identifier printed on shelf labels.
    pub product_code: String,

    /// Display name shown to the cashier.
    pub product_name: String,

    /// Unit price in cents.
    pub unit_price_cents: i64,

    /// Quantity on hand.
    pub stock_qty: Quantity,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff login.
///
/// Not exported to TypeScript: the password hash never leaves the server.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Free-form role chosen at registration ("cashier", "manager", ...).
    pub job_role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bill Counter
// =============================================================================

/// Persisted per-month counter behind bill numbers.
///
/// `last_number` is the count of bills issued under `prefix`; it only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BillCounter {
    /// `YYMM` month key.
    pub prefix: String,
    pub last_number: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Daily Bill
// =============================================================================

/// A recorded checkout. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyBill {
    /// Surrogate row id.
    pub id: i64,

    /// Calendar date the bill belongs to.
    #[ts(as = "String")]
    pub bill_date: NaiveDate,

    /// Human-readable `YYMM-NNNNNN` identifier.
    pub bill_id: String,

    /// Product codes of the lines, in checkout order.
    pub product_codes: Vec<String>,

    /// Bill total in cents.
    pub total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DailyBill {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Parses `bill_id` back into its prefix and sequence.
    pub fn bill_number(&self) -> CoreResult<BillNumber> {
        Ok(self.bill_id.parse::<BillNumber>()?)
    }
}

// =============================================================================
// Bill Line
// =============================================================================

/// One line of a checkout as submitted by the till.
///
/// Only the product code reaches the bill. Quantity, price and line total
/// are till-side arithmetic and are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillLine {
    pub product_code: String,
}

impl BillLine {
    pub fn new(product_code: impl Into<String>) -> Self {
        BillLine {
            product_code: product_code.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_parse_and_display() {
        let qty = Quantity::parse_field("productQty", "2.5").unwrap();
        assert_eq!(qty.hundredths(), 250);
        assert_eq!(qty.to_string(), "2.50");
        assert!(qty.is_positive());
        assert!(Quantity::parse_field("productQty", "two").is_err());
    }

    #[test]
    fn test_daily_bill_number() {
        let bill = DailyBill {
            id: 1,
            bill_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            bill_id: "2506-000042".to_string(),
            product_codes: vec!["RICE-5KG".to_string()],
            total_cents: 12_50,
            created_at: Utc::now(),
        };

        let number = bill.bill_number().unwrap();
        assert_eq!(number.prefix().to_string(), "2506");
        assert_eq!(number.sequence(), 42);
        assert_eq!(bill.total().to_string(), "12.50");
    }
}
