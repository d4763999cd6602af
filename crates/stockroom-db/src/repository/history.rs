//! # History Repository (SQLite)
//!
//! Append and read. There is deliberately no update or delete.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{HistoryRecord, SearchQuery};

use super::HistoryRepository;
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteHistoryRepository { pool }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, record: &HistoryRecord) -> DbResult<()> {
        debug!(action = %record.action, product_id = ?record.product_id, "Appending history");

        sqlx::query(
            r#"
            INSERT INTO history (id, action, product_id, user_id, details, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.id)
        .bind(&record.action)
        .bind(&record.product_id)
        .bind(&record.user_id)
        .bind(&record.details)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, action, product_id, user_id, details, timestamp
            FROM history
            ORDER BY timestamp DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<HistoryRecord>> {
        debug!(query = %query.as_str(), "Searching history");

        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, action, product_id, user_id, details, timestamp
            FROM history
            WHERE instr(lower(action), ?1) > 0
               OR instr(lower(details), ?1) > 0
            ORDER BY timestamp DESC, id
            "#,
        )
        .bind(query.needle())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
