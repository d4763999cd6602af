//! # Application State
//!
//! Everything a command needs, built once at startup and shared by
//! reference.
//!
//! ## Thread Safety
//! Repositories are `Arc<dyn Trait + Send + Sync>`; the SQLite ones share a
//! pool and the in-memory ones share one mutex-guarded store. Config and
//! the password service are read-only after construction.

use thiserror::Error;
use tracing::info;

use stockroom_db::{Database, DbError, MemoryStore, Repositories};

use super::config::{AppConfig, ConfigError};
use crate::auth::PasswordService;

/// Failures while bringing the application up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Debug)]
pub struct AppState {
    repos: Repositories,
    config: AppConfig,
    passwords: PasswordService,
    database: Option<Database>,
}

impl AppState {
    /// Wraps an existing repository bundle.
    pub fn new(repos: Repositories, config: AppConfig) -> Result<Self, ConfigError> {
        let passwords = PasswordService::new(config.security.params()?);
        Ok(AppState {
            repos,
            config,
            passwords,
            database: None,
        })
    }

    /// Opens (creating if needed) the SQLite database named by the config
    /// and runs migrations.
    pub async fn open(config: AppConfig) -> Result<Self, StartupError> {
        let db_config = config.database.db_config();
        if !db_config.is_in_memory() {
            if let Some(parent) = db_config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let database = Database::new(db_config).await?;
        let mut state = AppState::new(database.repositories(), config)?;
        state.database = Some(database);

        info!("Application state ready");
        Ok(state)
    }

    /// A throwaway state over process memory. Nothing is persisted.
    pub fn in_memory(config: AppConfig) -> Result<Self, ConfigError> {
        AppState::new(MemoryStore::new().repositories(), config)
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    /// Closes the database pool, if there is one.
    pub async fn shutdown(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}
