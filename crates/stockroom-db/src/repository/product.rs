//! # Product Repository (SQLite)
//!
//! Product CRUD, read-time name resolution and the guarded quantity update.
//!
//! ## Name Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products p                                                             │
//! │    LEFT JOIN categories c ON c.id = p.category_id  → category_name      │
//! │    LEFT JOIN suppliers  s ON s.id = p.supplier_id  → supplier_name      │
//! │                                                                         │
//! │  Renaming "Informatique" is visible on the next read of every product   │
//! │  in it; nothing is copied into the product row.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Quantity Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET quantity = quantity + ?delta                       │
//! │  WHERE id = ?id AND quantity + ?delta BETWEEN 0 AND ?max                │
//! │                                                                         │
//! │  1 row  → applied                                                       │
//! │  0 rows → product missing (NotFound) or out of range (Ok(false))        │
//! │                                                                         │
//! │  The check and the write are one statement, so a stale read in the     │
//! │  caller can never drive the quantity below zero. An overflowing sum     │
//! │  turns REAL in SQLite and fails the BETWEEN as well.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{Product, ProductView, SearchQuery, MAX_STOCK_QUANTITY};

use super::ProductRepository;
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str =
    "id, name, reference, category_id, supplier_id, quantity, unit_price_cents, date_added";

const PRODUCT_VIEW_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.reference, p.category_id, p.supplier_id,
        p.quantity, p.unit_price_cents, p.date_added,
        c.name AS category_name,
        s.name AS supplier_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN suppliers s ON s.id = p.supplier_id
"#;

#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductRepository { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, reference, category_id, supplier_id,
                quantity, unit_price_cents, date_added
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.reference)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.quantity)
        .bind(product.unit_price_cents)
        .bind(product.date_added)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn get_view(&self, id: &str) -> DbResult<Option<ProductView>> {
        let sql = format!("{PRODUCT_VIEW_SELECT} WHERE p.id = ?1");
        let view = sqlx::query_as::<_, ProductView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                reference = ?3,
                category_id = ?4,
                supplier_id = ?5,
                quantity = ?6,
                unit_price_cents = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.reference)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.quantity)
        .bind(product.unit_price_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn list_views(&self) -> DbResult<Vec<ProductView>> {
        let sql = format!("{PRODUCT_VIEW_SELECT} ORDER BY p.name, p.id");
        let views = sqlx::query_as::<_, ProductView>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<ProductView>> {
        debug!(query = %query.as_str(), "Searching products");

        let sql = format!(
            r#"
            {PRODUCT_VIEW_SELECT}
            WHERE instr(lower(p.name), ?1) > 0
               OR instr(lower(p.reference), ?1) > 0
               OR instr(lower(COALESCE(c.name, '')), ?1) > 0
            ORDER BY p.name, p.id
            "#
        );
        let views = sqlx::query_as::<_, ProductView>(&sql)
            .bind(query.needle())
            .fetch_all(&self.pool)
            .await?;

        debug!(count = views.len(), "Search returned products");
        Ok(views)
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<bool> {
        debug!(id = %id, delta = delta, "Adjusting quantity");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2
            WHERE id = ?1 AND quantity + ?2 BETWEEN 0 AND ?3
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(MAX_STOCK_QUANTITY)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Ok(false),
            None => Err(DbError::not_found("Product", id)),
        }
    }
}
