//! # Category Repository (SQLite)

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{Category, SearchQuery};

use super::CategoryRepository;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCategoryRepository { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn insert(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, "Updating category");

        let result = sqlx::query("UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Category>> {
        debug!(query = %query.as_str(), "Searching categories");

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description FROM categories
            WHERE instr(lower(name), ?1) > 0
               OR instr(lower(description), ?1) > 0
            ORDER BY name, id
            "#,
        )
        .bind(query.needle())
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
