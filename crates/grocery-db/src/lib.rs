//! # grocery-db: Database Layer for the Grocery POS
//!
//! This crate provides database access for the grocery POS backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Grocery POS Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /dailybill/save-bill)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    grocery-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │    │ BillRepo      │    │   schema.sql │  │   │
//! │  │   │ Management    │    │ CounterRepo   │    │              │  │   │
//! │  │   └───────┬───────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │           │            ┌───────┴───────┐                       │   │
//! │  │           └───────────►│ BillSequencer │ counter + bill in     │   │
//! │  │                        │               │ one transaction       │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (GROCERY_DATABASE_PATH)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and bill issuing error types
//! - [`repository`] - Repository implementations
//! - [`sequencer`] - Atomic bill numbering
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grocery_db::{Database, DbConfig};
//! use grocery_core::BillNumberDate;
//!
//! let db = Database::new(DbConfig::new("./grocery.db")).await?;
//!
//! let bill = db
//!     .sequencer(BillNumberDate::BillDate)
//!     .issue_bill(date, &lines, total)
//!     .await?;
//! println!("Saved {}", bill.bill_id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sequencer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, IssueBillError};
pub use pool::{Database, DbConfig};
pub use sequencer::BillSequencer;

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::counter::CounterRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
