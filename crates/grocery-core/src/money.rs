//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! two-decimal fixed-point parsing shared with [`Quantity`](crate::types::Quantity).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The checkout screen sums line totals in JavaScript:                    │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "0.30000000000000004" ──parse──► 30 cents                            │
//! │    Everything after the wire boundary is exact integer math.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The database column was `DECIMAL(10, 2)`. On the wire, amounts are accepted
//! as JSON numbers *or* strings and always emitted as strings (`"10.99"`), see
//! [`decimal`].
//!
//! ## Usage
//! ```rust
//! use grocery_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.to_string(), "15.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative total is representable so validation can
///   reject it with a proper message instead of failing to parse
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal amount, naming `field` in the error.
    ///
    /// More than two fractional digits are rounded half away from zero, so a
    /// float-summed `"12.345"` becomes 1235 cents.
    pub fn parse_field(field: &str, s: &str) -> Result<Self, ValidationError> {
        parse_fixed2(field, s).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering (`"10.99"`, `"-5.50"`), no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed2(self.0))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_field("amount", s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

// =============================================================================
// Fixed-Point Helpers
// =============================================================================

/// Parses a decimal string into hundredths.
///
/// ## Accepted Input
/// ```text
/// "10"      → 1000
/// "10.5"    → 1050
/// "+0.99"   → 99
/// "-3.20"   → -320
/// "12.345"  → 1235   (half away from zero)
/// "1e3", "", "1.2.3", "abc" → InvalidFormat
/// ```
pub(crate) fn parse_fixed2(field: &str, s: &str) -> Result<i64, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }

    let (negative, body) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(ValidationError::invalid_format(field, "must be a decimal number"));
    }

    let overflow = || ValidationError::invalid_format(field, "amount is too large");

    let mut value: i64 = 0;
    for digit in int_part.bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(digit - b'0')))
            .ok_or_else(overflow)?;
    }

    let mut frac = frac_part.bytes();
    for _ in 0..2 {
        let digit = frac.next().map_or(0, |d| i64::from(d - b'0'));
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(overflow)?;
    }
    if frac.next().is_some_and(|d| d >= b'5') {
        value = value.checked_add(1).ok_or_else(overflow)?;
    }

    Ok(if negative { -value } else { value })
}

/// Formats hundredths as a two-decimal string.
pub(crate) fn format_fixed2(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// =============================================================================
// Wire Serde
// =============================================================================

/// Serde adapter for two-decimal fixed-point values on the HTTP wire.
///
/// ## Usage
/// ```rust
/// use grocery_core::money::{self, Money};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(with = "money::decimal")]
///     price: Money,
/// }
/// ```
pub mod decimal {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::{format_fixed2, parse_fixed2};

    /// Emits the value as a string, e.g. `"10.99"`.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Copy + Into<i64>,
        S: Serializer,
    {
        serializer.serialize_str(&format_fixed2((*value).into()))
    }

    /// Accepts a JSON number or a numeric string.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: From<i64>,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FixedPointVisitor).map(T::from)
    }

    struct FixedPointVisitor;

    impl<'de> Visitor<'de> for FixedPointVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal number or numeric string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            parse_fixed2("value", v).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            v.checked_mul(100)
                .ok_or_else(|| E::custom("value is too large"))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v)
                .ok()
                .and_then(|v| v.checked_mul(100))
                .ok_or_else(|| E::custom("value is too large"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if !v.is_finite() {
                return Err(E::custom("value must be a finite number"));
            }
            // f64 Display never uses exponent notation
            parse_fixed2("value", &v.to_string()).map_err(E::custom)
        }
    }

    /// Same adapter for optional fields (`null`/missing → `None`).
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
        where
            T: Copy + Into<i64>,
            S: Serializer,
        {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            T: From<i64>,
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(deserialize_with = "super::deserialize::<i64, _>")] i64);

            let wrapped: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(wrapped.map(|Wrapper(v)| T::from(v)))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
