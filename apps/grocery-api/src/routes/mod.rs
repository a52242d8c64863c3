//! # Route Handlers
//!
//! One module per resource, each exposing a `router()` that `app()` nests
//! under its prefix.
//!
//! ```text
//! /login/*       auth.rs      staff accounts
//! /product/*     product.rs   catalog CRUD
//! /dailybill/*   bill.rs      checkout and bill lookup
//! ```

use serde::Serialize;

pub mod auth;
pub mod bill;
pub mod product;

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
