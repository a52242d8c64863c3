//! # grocery-core: Pure Business Logic for the Grocery POS
//!
//! This crate holds the domain model of the grocery point-of-sale backend:
//! money, quantities, catalog and bill types, bill numbering rules, and
//! validation. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Grocery POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Till frontend (browser)                      │   │
//! │  │    Login ──► Product admin ──► Checkout ──► Save bill           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    grocery-api (axum)                           │   │
//! │  │    /login, /product, /dailybill                                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ grocery-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  billing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ BillPrefix│  │   rules   │  │   │
//! │  │   │ DailyBill │  │  decimal  │  │ BillNumber│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  grocery-db (Database Layer)                    │   │
//! │  │        SQLite repositories, migrations, bill sequencer          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, DailyBill, BillCounter, User)
//! - [`money`] - Money type with integer arithmetic and decimal wire format
//! - [`billing`] - Bill prefixes, bill numbers, numbering date policy
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use grocery_core::{BillNumber, BillPrefix};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
//! let number = BillNumber::new(BillPrefix::from_date(date), 42).unwrap();
//! assert_eq!(number.to_string(), "2506-000042");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use billing::{BillNumber, BillNumberDate, BillPrefix};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed on a single bill.
///
/// ## Business Reason
/// A grocery basket never gets near this; anything larger is a stuck
/// scanner or a replayed request.
pub const MAX_BILL_LINES: usize = 500;
