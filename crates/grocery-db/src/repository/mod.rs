//! # Repository Module
//!
//! Database repository implementations for the grocery POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list()                                          │
//! │       ▼                                                                 │
//! │  ProductRepository / UserRepository / BillRepository / CounterRepo    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Writes that must share a transaction (counter increment + bill        │
//! │  insert) take a `&mut SqliteConnection` instead of using the pool.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD
//! - [`user::UserRepository`] - Staff logins
//! - [`bill::BillRepository`] - Recorded bills
//! - [`counter::CounterRepository`] - Per-month bill counters

pub mod bill;
pub mod counter;
pub mod product;
pub mod user;
