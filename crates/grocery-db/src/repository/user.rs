//! # User Repository
//!
//! Staff logins. Stores password hashes only; hashing and verification
//! happen in the API layer.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use grocery_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a user.
    ///
    /// ## Errors
    /// `UniqueViolation { field: "email" }` when the email is already registered.
    pub async fn insert(&self, email: &str, password_hash: &str, job_role: &str) -> DbResult<User> {
        debug!(email = %email, job_role = %job_role, "Inserting user");

        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, job_role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, email, password_hash, job_role, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(job_role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("email", email))?;

        Ok(user)
    }

    /// Looks a user up by email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, job_role, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces a user's password hash.
    pub async fn update_password(&self, email: &str, password_hash: &str) -> DbResult<()> {
        debug!(email = %email, "Updating password");

        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = ?2, updated_at = ?3
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", email));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_register_and_find() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();

        let user = repo.insert("cashier@shop.lk", "$argon2id$hash", "cashier").await.unwrap();
        assert!(user.id > 0);

        let found = repo.find_by_email("cashier@shop.lk").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.job_role, "cashier");

        assert!(repo.find_by_email("nobody@shop.lk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        repo.insert("a@shop.lk", "h1", "cashier").await.unwrap();

        let err = repo.insert("a@shop.lk", "h2", "manager").await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_update_password() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        repo.insert("a@shop.lk", "old", "cashier").await.unwrap();

        repo.update_password("a@shop.lk", "new").await.unwrap();
        let user = repo.find_by_email("a@shop.lk").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new");

        let err = repo.update_password("b@shop.lk", "x").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
