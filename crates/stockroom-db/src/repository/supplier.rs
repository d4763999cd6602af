//! # Supplier Repository (SQLite)

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{SearchQuery, Supplier};

use super::SupplierRepository;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct SqliteSupplierRepository {
    pool: SqlitePool,
}

impl SqliteSupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSupplierRepository { pool }
    }
}

#[async_trait]
impl SupplierRepository for SqliteSupplierRepository {
    async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, name, contact, email, address) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, email, address FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, "Updating supplier");

        let result = sqlx::query(
            "UPDATE suppliers SET name = ?2, contact = ?3, email = ?4, address = ?5 WHERE id = ?1",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Products keep existing; their `supplier_id` is cleared by the
    /// `ON DELETE SET NULL` foreign key.
    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, email, address FROM suppliers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Supplier>> {
        debug!(query = %query.as_str(), "Searching suppliers");

        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact, email, address FROM suppliers
            WHERE instr(lower(name), ?1) > 0
               OR instr(lower(email), ?1) > 0
               OR instr(lower(contact), ?1) > 0
            ORDER BY name, id
            "#,
        )
        .bind(query.needle())
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}
