//! # Stock Movement Repositories (SQLite)
//!
//! Entries and exits are insert-only here. Adjusting the product quantity
//! is a separate call on [`ProductRepository`](super::ProductRepository);
//! the desktop layer sequences the two.
//!
//! Movement rows carry no foreign keys, so the views resolve names with
//! LEFT JOINs and report `None` for products or suppliers deleted since.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{SearchQuery, StockEntry, StockEntryView, StockExit, StockExitView};

use super::{StockEntryRepository, StockExitRepository};
use crate::error::DbResult;

const ENTRY_VIEW_SELECT: &str = r#"
    SELECT
        e.id, e.product_id, e.supplier_id, e.quantity, e.unit_cost_cents, e.date,
        p.name AS product_name,
        s.name AS supplier_name
    FROM stock_entries e
    LEFT JOIN products p ON p.id = e.product_id
    LEFT JOIN suppliers s ON s.id = e.supplier_id
"#;

const EXIT_VIEW_SELECT: &str = r#"
    SELECT
        x.id, x.product_id, x.quantity, x.destination, x.date,
        p.name AS product_name
    FROM stock_exits x
    LEFT JOIN products p ON p.id = x.product_id
"#;

// =============================================================================
// Entries
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteStockEntryRepository {
    pool: SqlitePool,
}

impl SqliteStockEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStockEntryRepository { pool }
    }
}

#[async_trait]
impl StockEntryRepository for SqliteStockEntryRepository {
    async fn insert(&self, entry: &StockEntry) -> DbResult<()> {
        debug!(
            id = %entry.id,
            product_id = %entry.product_id,
            quantity = entry.quantity,
            "Inserting stock entry"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_entries (id, product_id, supplier_id, quantity, unit_cost_cents, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(&entry.supplier_id)
        .bind(entry.quantity)
        .bind(entry.unit_cost_cents)
        .bind(entry.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<StockEntry>> {
        let entries = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT id, product_id, supplier_id, quantity, unit_cost_cents, date
            FROM stock_entries
            ORDER BY date DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn list_views(&self) -> DbResult<Vec<StockEntryView>> {
        let sql = format!("{ENTRY_VIEW_SELECT} ORDER BY e.date DESC, e.id");
        let views = sqlx::query_as::<_, StockEntryView>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockEntryView>> {
        debug!(query = %query.as_str(), "Searching stock entries");

        let sql = format!(
            r#"
            {ENTRY_VIEW_SELECT}
            WHERE instr(lower(COALESCE(p.name, '')), ?1) > 0
               OR instr(lower(COALESCE(s.name, '')), ?1) > 0
               OR instr(lower(e.date), ?1) > 0
            ORDER BY e.date DESC, e.id
            "#
        );
        let views = sqlx::query_as::<_, StockEntryView>(&sql)
            .bind(query.needle())
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }
}

// =============================================================================
// Exits
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteStockExitRepository {
    pool: SqlitePool,
}

impl SqliteStockExitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStockExitRepository { pool }
    }
}

#[async_trait]
impl StockExitRepository for SqliteStockExitRepository {
    async fn insert(&self, exit: &StockExit) -> DbResult<()> {
        debug!(
            id = %exit.id,
            product_id = %exit.product_id,
            quantity = exit.quantity,
            "Inserting stock exit"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_exits (id, product_id, quantity, destination, date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&exit.id)
        .bind(&exit.product_id)
        .bind(exit.quantity)
        .bind(&exit.destination)
        .bind(exit.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<StockExit>> {
        let exits = sqlx::query_as::<_, StockExit>(
            r#"
            SELECT id, product_id, quantity, destination, date
            FROM stock_exits
            ORDER BY date DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(exits)
    }

    async fn list_views(&self) -> DbResult<Vec<StockExitView>> {
        let sql = format!("{EXIT_VIEW_SELECT} ORDER BY x.date DESC, x.id");
        let views = sqlx::query_as::<_, StockExitView>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockExitView>> {
        debug!(query = %query.as_str(), "Searching stock exits");

        let sql = format!(
            r#"
            {EXIT_VIEW_SELECT}
            WHERE instr(lower(COALESCE(p.name, '')), ?1) > 0
               OR instr(lower(x.destination), ?1) > 0
               OR instr(lower(x.date), ?1) > 0
            ORDER BY x.date DESC, x.id
            "#
        );
        let views = sqlx::query_as::<_, StockExitView>(&sql)
            .bind(query.needle())
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }
}
