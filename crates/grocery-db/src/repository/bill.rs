//! # Daily Bill Repository
//!
//! Reads and the single write path for recorded bills.
//!
//! Bills are immutable: there is an insert (only called by the sequencer,
//! inside its transaction) and reads, nothing else.
//!
//! ## Storage
//! ```text
//! daily_bills
//! ┌────┬────────────┬─────────────┬──────────────────────────┬─────────────┐
//! │ id │ bill_date  │ bill_id     │ product_codes (JSON)     │ total_cents │
//! ├────┼────────────┼─────────────┼──────────────────────────┼─────────────┤
//! │ 1  │ 2025-06-15 │ 2506-000001 │ ["RICE-5KG","MILK-1L"]   │ 1570        │
//! │ 2  │ 2025-06-15 │ 2506-000002 │ ["EGG-12"]               │ 480         │
//! └────┴────────────┴─────────────┴──────────────────────────┴─────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use grocery_core::{BillNumber, DailyBill, Money};

/// Row shape of `daily_bills`; `product_codes` is still JSON text here.
#[derive(Debug, sqlx::FromRow)]
struct DailyBillRow {
    id: i64,
    bill_date: NaiveDate,
    bill_id: String,
    product_codes: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<DailyBillRow> for DailyBill {
    type Error = DbError;

    fn try_from(row: DailyBillRow) -> Result<Self, Self::Error> {
        let product_codes: Vec<String> =
            serde_json::from_str(&row.product_codes).map_err(|e| DbError::Corrupt {
                entity: format!("DailyBill {}", row.bill_id),
                message: e.to_string(),
            })?;

        Ok(DailyBill {
            id: row.id,
            bill_date: row.bill_date,
            bill_id: row.bill_id,
            product_codes,
            total_cents: row.total_cents,
            created_at: row.created_at,
        })
    }
}

/// Repository for daily bill operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Inserts a bill on the caller's connection (normally the sequencer's
    /// open transaction).
    ///
    /// ## Errors
    /// `UniqueViolation { field: "billId" }` when `bill_id` already exists.
    pub async fn insert(
        conn: &mut SqliteConnection,
        bill_id: &BillNumber,
        bill_date: NaiveDate,
        product_codes: &[String],
        total: Money,
    ) -> DbResult<DailyBill> {
        let bill_id = bill_id.to_string();
        debug!(bill_id = %bill_id, lines = product_codes.len(), total = %total, "Inserting bill");

        let codes_json =
            serde_json::to_string(product_codes).map_err(|e| DbError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, DailyBillRow>(
            r#"
            INSERT INTO daily_bills (bill_date, bill_id, product_codes, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, bill_date, bill_id, product_codes, total_cents, created_at
            "#,
        )
        .bind(bill_date)
        .bind(&bill_id)
        .bind(&codes_json)
        .bind(total.cents())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("billId", &bill_id))?;

        DailyBill::try_from(row)
    }

    /// Gets a bill by its `YYMM-NNNNNN` id.
    pub async fn get_by_bill_id(&self, bill_id: &BillNumber) -> DbResult<Option<DailyBill>> {
        let row = sqlx::query_as::<_, DailyBillRow>(
            r#"
            SELECT id, bill_date, bill_id, product_codes, total_cents, created_at
            FROM daily_bills
            WHERE bill_id = ?1
            "#,
        )
        .bind(bill_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DailyBill::try_from).transpose()
    }

    /// Lists the bills dated `date`, in bill id order.
    pub async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<DailyBill>> {
        let rows = sqlx::query_as::<_, DailyBillRow>(
            r#"
            SELECT id, bill_date, bill_id, product_codes, total_cents, created_at
            FROM daily_bills
            WHERE bill_date = ?1
            ORDER BY bill_id ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        debug!(date = %date, count = rows.len(), "Listed bills");
        rows.into_iter().map(DailyBill::try_from).collect()
    }

    /// Counts bills whose id starts with `prefix`.
    pub async fn count_for_prefix(&self, prefix: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM daily_bills WHERE substr(bill_id, 1, 4) = ?1",
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
