//! # User Repository (SQLite)
//!
//! The only place that reads or writes `users.password_hash`. Every query
//! that returns [`User`] leaves that column out.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{SearchQuery, User};

use super::{UserCredentials, UserRepository};
use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, name, surname, email, role, created_at";

#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteUserRepository { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> DbResult<()> {
        debug!(id = %user.id, email = %user.email, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, email, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(user.role)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        debug!(email = %email, "Looking up credentials");

        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1 ORDER BY created_at LIMIT 1"
        );
        let credentials = sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credentials)
    }

    async fn update(&self, user: &User, password_hash: Option<&str>) -> DbResult<()> {
        debug!(id = %user.id, rehash = password_hash.is_some(), "Updating user");

        // COALESCE keeps the stored hash when none is given
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?2,
                surname = ?3,
                email = ?4,
                role = ?5,
                password_hash = COALESCE(?6, password_hash)
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(user.role)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY surname, name, id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<User>> {
        debug!(query = %query.as_str(), "Searching users");

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE instr(lower(name), ?1) > 0
               OR instr(lower(surname), ?1) > 0
               OR instr(lower(email), ?1) > 0
            ORDER BY surname, name, id
            "#
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(query.needle())
            .fetch_all(&self.pool)
            .await?;

        debug!(count = users.len(), "Search returned users");
        Ok(users)
    }
}
