//! # Bill Numbering
//!
//! Month prefixes and bill identifiers.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bill Number Anatomy                              │
//! │                                                                         │
//! │        2 5 0 6 - 0 0 0 0 4 2                                            │
//! │        ├─┘ ├─┘   └─────────┘                                            │
//! │        YY  MM    sequence, zero-padded to 6 digits                      │
//! │                                                                         │
//! │  • Always 11 ASCII characters: 4 digits, '-', 6 digits                 │
//! │  • Sequence restarts at 000001 every calendar month                    │
//! │  • Sequence comes from the bill_counters row for the prefix            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only formats and parses. Handing out numbers is the job of the
//! sequencer in grocery-db, which owns the counter row.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Number of digits in the sequence part.
pub const SEQUENCE_DIGITS: usize = 6;

/// Largest sequence a month can hold.
pub const MAX_SEQUENCE: u32 = 999_999;

// =============================================================================
// Bill Prefix
// =============================================================================

/// The `YYMM` month key scoping a counter and a bill-number namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillPrefix {
    year: u8,
    month: u8,
}

impl BillPrefix {
    /// Derives the prefix from a calendar date.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use grocery_core::billing::BillPrefix;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    /// assert_eq!(BillPrefix::from_date(date).to_string(), "2506");
    /// ```
    pub fn from_date(date: NaiveDate) -> Self {
        BillPrefix {
            year: date.year().rem_euclid(100) as u8,
            month: date.month() as u8,
        }
    }

    /// Two-digit year.
    pub fn year(&self) -> u8 {
        self.year
    }

    /// Month, 1-12.
    pub fn month(&self) -> u8 {
        self.month
    }
}

impl fmt::Display for BillPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.year, self.month)
    }
}

impl FromStr for BillPrefix {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "prefix",
                "must be four digits (YYMM)",
            ));
        }

        // All four bytes are ASCII digits, so slicing is safe and parse can't fail
        let year: u8 = s[..2].parse().unwrap_or_default();
        let month: u8 = s[2..].parse().unwrap_or_default();

        if !(1..=12).contains(&month) {
            return Err(ValidationError::invalid_format(
                "prefix",
                "month must be between 01 and 12",
            ));
        }

        Ok(BillPrefix { year, month })
    }
}

// =============================================================================
// Bill Number
// =============================================================================

/// A minted bill identifier, `PREFIX-NNNNNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillNumber {
    prefix: BillPrefix,
    sequence: u32,
}

impl BillNumber {
    /// Builds a bill number from a counter value.
    ///
    /// ## Errors
    /// - `SequenceExhausted` when `sequence` no longer fits six digits
    /// - `Validation` when `sequence` is zero or negative (counters start at 1)
    pub fn new(prefix: BillPrefix, sequence: i64) -> CoreResult<Self> {
        if sequence < 1 {
            return Err(ValidationError::MustBePositive {
                field: "sequence".to_string(),
            }
            .into());
        }
        if sequence > i64::from(MAX_SEQUENCE) {
            return Err(CoreError::SequenceExhausted {
                prefix: prefix.to_string(),
                max: MAX_SEQUENCE,
            });
        }

        Ok(BillNumber {
            prefix,
            sequence: sequence as u32,
        })
    }

    pub fn prefix(&self) -> BillPrefix {
        self.prefix
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:0width$}",
            self.prefix,
            self.sequence,
            width = SEQUENCE_DIGITS
        )
    }
}

impl FromStr for BillNumber {
    type Err = ValidationError;

    /// Parses `YYMM-NNNNNN`; anything else is `InvalidFormat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("billId", "expected YYMM-NNNNNN");

        let (prefix, sequence) = s.split_once('-').ok_or_else(invalid)?;
        if sequence.len() != SEQUENCE_DIGITS || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let prefix: BillPrefix = prefix.parse().map_err(|_| invalid())?;
        let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }

        Ok(BillNumber { prefix, sequence })
    }
}

// =============================================================================
// Numbering Date Policy
// =============================================================================

/// Which date decides the month a bill is numbered under.
///
/// ```text
/// Bill dated 2025-06-30, saved on 2025-07-01:
///
///   BillDate  ──► 2506-NNNNNN   (matches the date printed on the bill)
///   IssueTime ──► 2507-NNNNNN   (matches when the till pressed "save")
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillNumberDate {
    /// Use the bill's own date (backdated bills land in their own month).
    #[default]
    BillDate,
    /// Use the server's date at the moment the bill is issued.
    IssueTime,
}

impl BillNumberDate {
    /// Picks the date the prefix is derived from.
    pub fn numbering_date(&self, bill_date: NaiveDate, today: NaiveDate) -> NaiveDate {
        match self {
            BillNumberDate::BillDate => bill_date,
            BillNumberDate::IssueTime => today,
        }
    }
}

impl fmt::Display for BillNumberDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillNumberDate::BillDate => write!(f, "bill-date"),
            BillNumberDate::IssueTime => write!(f, "issue-time"),
        }
    }
}

impl FromStr for BillNumberDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bill-date" | "bill_date" | "date" => Ok(BillNumberDate::BillDate),
            "issue-time" | "issue_time" | "now" => Ok(BillNumberDate::IssueTime),
            other => Err(format!(
                "unknown bill number date source '{}', expected bill-date or issue-time",
                other
            )),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_prefix_from_date() {
        assert_eq!(BillPrefix::from_date(date(2025, 6, 15)).to_string(), "2506");
        assert_eq!(BillPrefix::from_date(date(2025, 12, 31)).to_string(), "2512");
        assert_eq!(BillPrefix::from_date(date(2100, 1, 1)).to_string(), "0001");
    }

    #[test]
    fn test_prefix_parse() {
        let prefix: BillPrefix = "2507".parse().unwrap();
        assert_eq!(prefix.year(), 25);
        assert_eq!(prefix.month(), 7);

        assert!("250".parse::<BillPrefix>().is_err());
        assert!("25a7".parse::<BillPrefix>().is_err());
        assert!("2513".parse::<BillPrefix>().is_err());
        assert!("2500".parse::<BillPrefix>().is_err());
    }

    #[test]
    fn test_bill_number_format() {
        let prefix = BillPrefix::from_date(date(2025, 6, 15));
        let number = BillNumber::new(prefix, 1).unwrap();
        assert_eq!(number.to_string(), "2506-000001");

        let number = BillNumber::new(prefix, 999_999).unwrap();
        assert_eq!(number.to_string(), "2506-999999");
        assert_eq!(number.to_string().len(), 11);
    }

    #[test]
    fn test_bill_number_bounds() {
        let prefix = BillPrefix::from_date(date(2025, 6, 15));
        assert!(matches!(
            BillNumber::new(prefix, 1_000_000),
            Err(CoreError::SequenceExhausted { .. })
        ));
        assert!(matches!(
            BillNumber::new(prefix, 0),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_bill_number_parse() {
        let number: BillNumber = "2506-000042".parse().unwrap();
        assert_eq!(number.prefix().to_string(), "2506");
        assert_eq!(number.sequence(), 42);

        for bad in ["2506000042", "2506-42", "2506-0000042", "25O6-000001", "2506-000000", "2506-00000a"] {
            assert!(bad.parse::<BillNumber>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_numbering_date_policy() {
        let bill_date = date(2025, 6, 30);
        let today = date(2025, 7, 1);

        assert_eq!(BillNumberDate::default(), BillNumberDate::BillDate);
        assert_eq!(BillNumberDate::BillDate.numbering_date(bill_date, today), bill_date);
        assert_eq!(BillNumberDate::IssueTime.numbering_date(bill_date, today), today);
    }

    #[test]
    fn test_numbering_date_parsing() {
        assert_eq!("bill-date".parse::<BillNumberDate>().unwrap(), BillNumberDate::BillDate);
        assert_eq!("ISSUE-TIME".parse::<BillNumberDate>().unwrap(), BillNumberDate::IssueTime);
        assert_eq!("now".parse::<BillNumberDate>().unwrap(), BillNumberDate::IssueTime);
        assert!("yesterday".parse::<BillNumberDate>().is_err());
        assert_eq!(BillNumberDate::IssueTime.to_string(), "issue-time");
    }
}
