//! # Bill Counter Repository
//!
//! The per-month counters behind bill numbers.
//!
//! ## The Increment Primitive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  increment_and_get("2506")                                              │
//! │                                                                         │
//! │  INSERT INTO bill_counters (prefix, last_number) VALUES ('2506', 1)    │
//! │  ON CONFLICT (prefix) DO UPDATE SET last_number = last_number + 1      │
//! │  RETURNING last_number                                                 │
//! │                                                                         │
//! │  • One statement: create-if-absent, increment and read back            │
//! │  • Takes the SQLite write lock, held until the enclosing transaction   │
//! │    commits or rolls back                                               │
//! │  • Two transactions can never read the same value                      │
//! │                                                                         │
//! │  NEVER: SELECT last_number ... then UPDATE ... SET last_number = ?     │
//! │         (two tills read 41, both write 42, both print 2506-000042)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use grocery_core::{BillCounter, BillPrefix};

/// Repository for bill counter operations.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    /// Creates a new CounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterRepository { pool }
    }

    /// Reads a counter without creating it.
    pub async fn get(&self, prefix: &BillPrefix) -> DbResult<Option<BillCounter>> {
        let counter = sqlx::query_as::<_, BillCounter>(
            r#"
            SELECT prefix, last_number, updated_at
            FROM bill_counters
            WHERE prefix = ?1
            "#,
        )
        .bind(prefix.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(counter)
    }

    /// Returns the counter for `prefix`, creating it at 0 when absent.
    ///
    /// Safe to race: the insert is a no-op when another caller got there first.
    pub async fn find_or_create(&self, prefix: &BillPrefix) -> DbResult<BillCounter> {
        let key = prefix.to_string();
        debug!(prefix = %key, "Finding or creating bill counter");

        sqlx::query(
            r#"
            INSERT INTO bill_counters (prefix, last_number, updated_at)
            VALUES (?1, 0, ?2)
            ON CONFLICT (prefix) DO NOTHING
            "#,
        )
        .bind(&key)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let counter = sqlx::query_as::<_, BillCounter>(
            r#"
            SELECT prefix, last_number, updated_at
            FROM bill_counters
            WHERE prefix = ?1
            "#,
        )
        .bind(&key)
        .fetch_one(&self.pool)
        .await?;

        Ok(counter)
    }

    /// Atomically creates-or-increments the counter and returns the new value.
    ///
    /// Runs on the caller's connection so it can share a transaction with
    /// the bill insert. Must be the first write of that transaction.
    pub async fn increment_and_get(conn: &mut SqliteConnection, prefix: &BillPrefix) -> DbResult<i64> {
        let key = prefix.to_string();

        let next: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bill_counters (prefix, last_number, updated_at)
            VALUES (?1, 1, ?2)
            ON CONFLICT (prefix) DO UPDATE SET
                last_number = last_number + 1,
                updated_at = excluded.updated_at
            RETURNING last_number
            "#,
        )
        .bind(&key)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        debug!(prefix = %key, last_number = next, "Incremented bill counter");
        Ok(next)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn prefix(s: &str) -> BillPrefix {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_counter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.counters().get(&prefix("2506")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.counters();

        let first = repo.find_or_create(&prefix("2506")).await.unwrap();
        assert_eq!(first.prefix, "2506");
        assert_eq!(first.last_number, 0);

        let again = repo.find_or_create(&prefix("2506")).await.unwrap();
        assert_eq!(again.last_number, 0);
    }

    #[tokio::test]
    async fn test_increment_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let p = prefix("2506");
        assert_eq!(CounterRepository::increment_and_get(&mut conn, &p).await.unwrap(), 1);
        assert_eq!(CounterRepository::increment_and_get(&mut conn, &p).await.unwrap(), 2);
        assert_eq!(CounterRepository::increment_and_get(&mut conn, &prefix("2507")).await.unwrap(), 1);
        drop(conn);

        let counter = db.counters().get(&p).await.unwrap().unwrap();
        assert_eq!(counter.last_number, 2);
    }

    #[tokio::test]
    async fn test_increment_rolls_back_with_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = prefix("2506");
        db.counters().find_or_create(&p).await.unwrap();

        {
            let mut tx = db.pool().begin().await.unwrap();
            CounterRepository::increment_and_get(&mut tx, &p).await.unwrap();
            // dropped without commit
        }

        let counter = db.counters().get(&p).await.unwrap().unwrap();
        assert_eq!(counter.last_number, 0);
    }
}
