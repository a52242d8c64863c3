//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD keyed by product code
//! - Catalog listing in name order (what the checkout picker shows)
//! - Price and stock updates

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use grocery_core::types::Quantity;
use grocery_core::{Money, Product};

const PRODUCT_COLUMNS: &str = r#"
    product_code,
    product_name,
    unit_price_cents,
    stock_qty,
    created_at,
    updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let catalog = repo.list().await?;
/// let rice = repo.get_by_code("RICE-5KG").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog ordered by product name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY product_name ASC, product_code ASC",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE product_code = ?1",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// `UniqueViolation { field: "productCode" }` when the code is taken.
    pub async fn insert(
        &self,
        code: &str,
        name: &str,
        unit_price: Money,
        stock_qty: Quantity,
    ) -> DbResult<Product> {
        debug!(product_code = %code, "Inserting product");

        let now = Utc::now();
        let product = Product {
            product_code: code.to_string(),
            product_name: name.to_string(),
            unit_price_cents: unit_price.cents(),
            stock_qty,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                product_code, product_name, unit_price_cents, stock_qty,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.product_code)
        .bind(&product.product_name)
        .bind(product.unit_price_cents)
        .bind(product.stock_qty)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("productCode", code))?;

        Ok(product)
    }

    /// Updates the price and stock of a product.
    ///
    /// ## Returns
    /// The updated product, or `NotFound` when no product has this code.
    pub async fn update_price_and_stock(
        &self,
        code: &str,
        unit_price: Money,
        stock_qty: Quantity,
    ) -> DbResult<Product> {
        debug!(product_code = %code, price = %unit_price, qty = %stock_qty, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                unit_price_cents = ?2,
                stock_qty = ?3,
                updated_at = ?4
            WHERE product_code = ?1
            "#,
        )
        .bind(code)
        .bind(unit_price.cents())
        .bind(stock_qty)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }

        self.get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Product", code))
    }

    /// Deletes a product.
    ///
    /// Bills keep the code in their product list; nothing cascades.
    pub async fn delete(&self, code: &str) -> DbResult<()> {
        debug!(product_code = %code, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE product_code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }

        Ok(())
    }

    /// Counts catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
