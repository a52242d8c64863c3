//! # Bill Sequencer
//!
//! Issues bill numbers and records bills as one unit of work.
//!
//! ## Issue Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        issue_bill(date, lines, total)                   │
//! │                                                                         │
//! │  1. validate_bill(lines, total)        ← no store access on failure    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. prefix = YYMM of numbering date    (BillNumberDate policy)         │
//! │       │                                                                 │
//! │  ┌────▼────────────────────── TRANSACTION ───────────────────────────┐ │
//! │  │ 3. n = increment_and_get(prefix)   ← first write, takes the lock  │ │
//! │  │ 4. bill_id = prefix-NNNNNN                                        │ │
//! │  │ 5. INSERT daily_bills (bill_id, date, codes, total)               │ │
//! │  │ 6. COMMIT                                                         │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DailyBill { bill_id: "2506-000042", ... }                             │
//! │                                                                         │
//! │  Any failure in 3-6 drops the transaction: the counter increment and  │
//! │  the bill row disappear together.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! SQLite allows one writer at a time. The counter upsert is the first write
//! of every issuing transaction, so concurrent issuers queue on the write
//! lock (bounded by the pool's busy timeout) and each sees the previous
//! committed value. N concurrent issues starting from k get exactly
//! `k+1 ..= k+N`.

use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use grocery_core::validation::validate_bill;
use grocery_core::{BillLine, BillNumber, BillNumberDate, BillPrefix, DailyBill, Money};

use crate::error::{DbError, IssueBillError};
use crate::repository::bill::BillRepository;
use crate::repository::counter::CounterRepository;

/// Mints bill numbers and persists bills atomically.
#[derive(Debug, Clone)]
pub struct BillSequencer {
    pool: SqlitePool,
    numbering: BillNumberDate,
}

impl BillSequencer {
    /// Creates a sequencer over `pool` using the given numbering date policy.
    pub fn new(pool: SqlitePool, numbering: BillNumberDate) -> Self {
        BillSequencer { pool, numbering }
    }

    /// The date policy deciding which month a bill is numbered under.
    pub fn numbering(&self) -> BillNumberDate {
        self.numbering
    }

    /// Issues the next bill number for the bill's month and records the bill.
    ///
    /// "Today" for the `IssueTime` policy is the server's local date.
    ///
    /// ## Errors
    /// See [`IssueBillError`]. Nothing is persisted on any error.
    pub async fn issue_bill(
        &self,
        date: NaiveDate,
        lines: &[BillLine],
        total: Money,
    ) -> Result<DailyBill, IssueBillError> {
        self.issue_bill_on(date, Local::now().date_naive(), lines, total)
            .await
    }

    /// Same as [`issue_bill`](Self::issue_bill) with an explicit issue date.
    pub async fn issue_bill_on(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        lines: &[BillLine],
        total: Money,
    ) -> Result<DailyBill, IssueBillError> {
        validate_bill(lines, total)?;

        let prefix = BillPrefix::from_date(self.numbering.numbering_date(date, today));
        let prefix_key = prefix.to_string();
        let product_codes: Vec<String> = lines
            .iter()
            .map(|line| line.product_code.trim().to_string())
            .collect();

        debug!(prefix = %prefix_key, lines = lines.len(), total = %total, "Issuing bill");

        let unavailable = |bill_id: Option<&BillNumber>| {
            let prefix = prefix_key.clone();
            let bill_id = bill_id.map(|b| b.to_string());
            move |source: DbError| IssueBillError::StoreUnavailable {
                prefix,
                bill_id,
                source,
            }
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DbError::from)
            .map_err(unavailable(None))?;

        let sequence = CounterRepository::increment_and_get(&mut tx, &prefix)
            .await
            .map_err(unavailable(None))?;

        let bill_number = BillNumber::new(prefix, sequence)?;

        let bill = match BillRepository::insert(&mut tx, &bill_number, date, &product_codes, total).await {
            Ok(bill) => bill,
            Err(err) if err.is_unique_violation() => {
                warn!(prefix = %prefix_key, bill_id = %bill_number, "Bill id already taken, rolling back");
                return Err(IssueBillError::Conflict {
                    prefix: prefix_key.clone(),
                    bill_id: bill_number.to_string(),
                });
            }
            Err(err) => return Err(unavailable(Some(&bill_number))(err)),
        };

        tx.commit()
            .await
            .map_err(DbError::from)
            .map_err(unavailable(Some(&bill_number)))?;

        info!(
            bill_id = %bill.bill_id,
            prefix = %prefix_key,
            total = %total,
            "Bill issued"
        );

        Ok(bill)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lines() -> Vec<BillLine> {
        vec![BillLine::new("RICE-5KG"), BillLine::new("MILK-1L")]
    }

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn counter_value(db: &Database, prefix: &str) -> Option<i64> {
        db.counters()
            .get(&prefix.parse().unwrap())
            .await
            .unwrap()
            .map(|c| c.last_number)
    }

    fn is_bill_id_shaped(id: &str) -> bool {
        let bytes = id.as_bytes();
        bytes.len() == 11
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit)
    }

    /// On-disk database so the pool can hold several real connections.
    struct TempDb {
        path: PathBuf,
    }

    impl TempDb {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("grocery-seq-{}.db", uuid::Uuid::new_v4()));
            TempDb { path }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
            }
        }
    }

    #[tokio::test]
    async fn test_bill_id_format_and_prefix() {
        let db = memory_db().await;
        let bill = db
            .sequencer(BillNumberDate::BillDate)
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(1570))
            .await
            .unwrap();

        assert!(is_bill_id_shaped(&bill.bill_id), "{}", bill.bill_id);
        assert!(bill.bill_id.starts_with("2506-"));
        assert_eq!(bill.bill_date, date(2025, 6, 15));
        assert_eq!(bill.product_codes, vec!["RICE-5KG", "MILK-1L"]);
        assert_eq!(bill.total_cents, 1570);
    }

    #[tokio::test]
    async fn test_sequential_issues_count_up() {
        let db = memory_db().await;
        let sequencer = db.sequencer(BillNumberDate::BillDate);

        let mut suffixes = Vec::new();
        for _ in 0..10 {
            let bill = sequencer
                .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
                .await
                .unwrap();
            suffixes.push(bill.bill_number().unwrap().sequence());
        }

        assert_eq!(suffixes, (1..=10).collect::<Vec<u32>>());
        assert_eq!(counter_value(&db, "2506").await, Some(10));
    }

    #[tokio::test]
    async fn test_month_rollover_starts_new_counter() {
        let db = memory_db().await;
        let sequencer = db.sequencer(BillNumberDate::BillDate);

        let mut june = Vec::new();
        for _ in 0..3 {
            let bill = sequencer
                .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
                .await
                .unwrap();
            june.push(bill.bill_id);
        }
        assert_eq!(june, vec!["2506-000001", "2506-000002", "2506-000003"]);

        let july = sequencer
            .issue_bill(date(2025, 7, 1), &lines(), Money::from_cents(100))
            .await
            .unwrap();
        assert_eq!(july.bill_id, "2507-000001");

        assert_eq!(counter_value(&db, "2506").await, Some(3));
        assert_eq!(counter_value(&db, "2507").await, Some(1));
    }

    #[tokio::test]
    async fn test_issue_time_policy_uses_today() {
        let db = memory_db().await;
        let bill = db
            .sequencer(BillNumberDate::IssueTime)
            .issue_bill_on(date(2025, 6, 30), date(2025, 7, 1), &lines(), Money::zero())
            .await
            .unwrap();

        assert_eq!(bill.bill_id, "2507-000001");
        assert_eq!(bill.bill_date, date(2025, 6, 30));
        assert_eq!(counter_value(&db, "2506").await, None);
    }

    #[tokio::test]
    async fn test_empty_lines_rejected_without_side_effects() {
        let db = memory_db().await;
        let err = db
            .sequencer(BillNumberDate::BillDate)
            .issue_bill(date(2025, 6, 15), &[], Money::from_cents(100))
            .await
            .unwrap_err();

        assert!(matches!(err, IssueBillError::Validation(_)));
        assert_eq!(counter_value(&db, "2506").await, None);
    }

    #[tokio::test]
    async fn test_negative_total_rejected_without_side_effects() {
        let db = memory_db().await;
        let sequencer = db.sequencer(BillNumberDate::BillDate);
        sequencer
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
            .await
            .unwrap();

        let err = sequencer
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(-1))
            .await
            .unwrap_err();

        assert!(matches!(err, IssueBillError::Validation(_)));
        assert_eq!(counter_value(&db, "2506").await, Some(1));
        assert_eq!(db.bills().count_for_prefix("2506").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_counter() {
        let db = memory_db().await;
        let sequencer = db.sequencer(BillNumberDate::BillDate);
        for _ in 0..3 {
            sequencer
                .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
                .await
                .unwrap();
        }

        // A stray row occupies the next id, so the insert after the increment fails
        let mut conn = db.pool().acquire().await.unwrap();
        BillRepository::insert(
            &mut conn,
            &"2506-000004".parse().unwrap(),
            date(2025, 6, 15),
            &["STRAY".to_string()],
            Money::zero(),
        )
        .await
        .unwrap();
        drop(conn);

        let err = sequencer
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
            .await
            .unwrap_err();

        match err {
            IssueBillError::Conflict { prefix, bill_id } => {
                assert_eq!(prefix, "2506");
                assert_eq!(bill_id, "2506-000004");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(counter_value(&db, "2506").await, Some(3));
        assert_eq!(db.bills().count_for_prefix("2506").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_month_rolls_back() {
        let db = memory_db().await;
        sqlx::query("INSERT INTO bill_counters (prefix, last_number, updated_at) VALUES ('2506', 999999, '2025-06-01T00:00:00Z')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .sequencer(BillNumberDate::BillDate)
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
            .await
            .unwrap_err();

        assert!(matches!(err, IssueBillError::Exhausted { ref prefix } if prefix == "2506"));
        assert_eq!(counter_value(&db, "2506").await, Some(999_999));
        assert_eq!(db.bills().count_for_prefix("2506").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let db = memory_db().await;
        db.close().await;

        let err = db
            .sequencer(BillNumberDate::BillDate)
            .issue_bill(date(2025, 6, 15), &lines(), Money::from_cents(100))
            .await
            .unwrap_err();

        assert!(matches!(err, IssueBillError::StoreUnavailable { ref prefix, bill_id: None, .. } if prefix == "2506"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issues_are_unique_and_contiguous() {
        let temp = TempDb::new();
        let db = Database::new(DbConfig::new(&temp.path).max_connections(5))
            .await
            .unwrap();
        let sequencer = db.sequencer(BillNumberDate::BillDate);

        let mut handles = Vec::new();
        for i in 0..50 {
            let sequencer = sequencer.clone();
            handles.push(tokio::spawn(async move {
                let lines = vec![BillLine::new(format!("P{i}"))];
                sequencer
                    .issue_bill(date(2025, 6, 15), &lines, Money::from_cents(100))
                    .await
            }));
        }

        let mut ids = HashSet::new();
        let mut suffixes = Vec::new();
        for handle in handles {
            let bill = handle.await.unwrap().unwrap();
            suffixes.push(bill.bill_number().unwrap().sequence());
            ids.insert(bill.bill_id);
        }

        suffixes.sort_unstable();
        assert_eq!(ids.len(), 50);
        assert_eq!(suffixes, (1..=50).collect::<Vec<u32>>());
        assert_eq!(counter_value(&db, "2506").await, Some(50));

        db.close().await;
    }
}
