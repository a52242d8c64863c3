//! # Daily Bill Routes
//!
//! Checkout and bill lookup under `/dailybill`.
//!
//! ```text
//! POST /dailybill/save-bill           {date, items, totalAmount} → 201 {success, message, billId}
//! GET  /dailybill/bill/{billId}       → {id, date, billId, productCodes, totalAmount, createdAt}
//! GET  /dailybill/by-date/{date}      → [ bill, ... ] ordered by billId
//! GET  /dailybill/counter/{prefix}    → {prefix, lastNumber}
//! ```
//!
//! ## Save Flow
//! ```text
//! body ──► parse date ──► BillLines ──► sequencer.issue_bill
//!                                            │
//!                                            ├── Ok(bill)      → 201 billId
//!                                            ├── Conflict      → retry once ─┬─ Ok  → 201
//!                                            │                               └─ Err → 500
//!                                            └── other error   → ApiError
//! ```
//!
//! Any client-sent `billNumber` is ignored: the server is the only source of
//! bill ids.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use grocery_core::money::decimal;
use grocery_core::validation::parse_bill_date;
use grocery_core::{BillLine, BillNumber, BillPrefix, DailyBill, Money, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// Checkout as posted by the till.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBillRequest {
    #[serde(default)]
    pub date: String,

    #[serde(default, alias = "billItems")]
    pub items: Vec<BillItem>,

    #[serde(default, alias = "totalBill", with = "decimal::option")]
    pub total_amount: Option<Money>,
}

/// One cart line. `productName`, `price`, `quantity` and `total` are sent by
/// the till but not read: only the code is recorded on the bill.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    #[serde(default)]
    pub product_code: String,
}

impl From<BillItem> for BillLine {
    fn from(item: BillItem) -> Self {
        BillLine::new(item.product_code)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBillResponse {
    pub success: bool,
    pub message: &'static str,
    pub bill_id: String,
}

/// A stored bill.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDto {
    pub id: i64,
    pub date: NaiveDate,
    pub bill_id: String,
    pub product_codes: Vec<String>,
    #[serde(with = "decimal")]
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

impl From<DailyBill> for BillDto {
    fn from(bill: DailyBill) -> Self {
        BillDto {
            total_amount: bill.total(),
            id: bill.id,
            date: bill.bill_date,
            bill_id: bill.bill_id,
            product_codes: bill.product_codes,
            created_at: bill.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDto {
    pub prefix: String,
    pub last_number: i64,
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save-bill", post(save_bill))
        .route("/bill/{bill_id}", get(get_bill))
        .route("/by-date/{date}", get(list_bills_by_date))
        .route("/counter/{prefix}", get(get_counter))
}

// =============================================================================
// Handlers
// =============================================================================

async fn save_bill(
    State(state): State<AppState>,
    payload: Result<Json<SaveBillRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveBillResponse>), ApiError> {
    let Json(req) = payload?;

    let date = parse_bill_date(&req.date)?;
    let total = req
        .total_amount
        .ok_or_else(|| ValidationError::required("totalAmount"))?;
    let lines: Vec<BillLine> = req.items.into_iter().map(BillLine::from).collect();

    let sequencer = state.sequencer();
    let bill = match sequencer.issue_bill(date, &lines, total).await {
        Err(err) if err.is_retryable() => {
            warn!(error = %err, "Bill number conflict, retrying once");
            sequencer.issue_bill(date, &lines, total).await?
        }
        result => result?,
    };

    Ok((
        StatusCode::CREATED,
        Json(SaveBillResponse {
            success: true,
            message: "Bill saved successfully",
            bill_id: bill.bill_id,
        }),
    ))
}

async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<BillDto>, ApiError> {
    let number: BillNumber = bill_id.parse()?;

    let bill = state
        .db
        .bills()
        .get_by_bill_id(&number)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", &bill_id))?;

    Ok(Json(bill.into()))
}

async fn list_bills_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<BillDto>>, ApiError> {
    let date = parse_bill_date(&date)?;
    let bills = state.db.bills().list_by_date(date).await?;
    Ok(Json(bills.into_iter().map(BillDto::from).collect()))
}

/// Last issued sequence for a month; `0` when nothing was issued yet.
async fn get_counter(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<CounterDto>, ApiError> {
    let prefix: BillPrefix = prefix.parse()?;

    let last_number = state
        .db
        .counters()
        .get(&prefix)
        .await?
        .map(|counter| counter.last_number)
        .unwrap_or(0);

    Ok(Json(CounterDto {
        prefix: prefix.to_string(),
        last_number,
    }))
}
