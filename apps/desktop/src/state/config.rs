//! # Application Configuration
//!
//! Settings loaded once at startup and read-only afterwards.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOCKROOM_DB_PATH=/srv/stock/stockroom.db                           │
//! │     STOCKROOM_LOW_STOCK_THRESHOLD=20                                    │
//! │     STOCKROOM_RECENT_WINDOW_DAYS=7                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                          │
//! │     ~/Library/Application Support/com.stockroom.stockroom/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     threshold 50, window 30 days, 10 recent movements                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockroom.toml
//! [database]
//! path = "/srv/stock/stockroom.db"
//! max_connections = 5
//!
//! [inventory]
//! low_stock_threshold = 50
//! recent_window_days = 30
//! recent_movements_limit = 10
//!
//! [security]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//! ```

use argon2::Params;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use stockroom_core::{
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_RECENT_MOVEMENTS_LIMIT, DEFAULT_RECENT_WINDOW_DAYS,
    MAX_RECENT_WINDOW_DAYS,
};
use stockroom_db::DbConfig;

const CONFIG_FILE: &str = "stockroom.toml";
const DATABASE_FILE: &str = "stockroom.db";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `None` means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseSettings {
    /// The database file to open: the configured path, else
    /// `stockroom.db` in the platform data directory, else the working
    /// directory.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }

    /// Pool settings for [`stockroom_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.resolved_path())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

/// `[inventory]` section: dashboard tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Products strictly below this quantity are "low stock".
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    /// Trailing window for the recent entries/exits counters.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,

    #[serde(default = "default_recent_movements_limit")]
    pub recent_movements_limit: usize,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_recent_window_days() -> i64 {
    DEFAULT_RECENT_WINDOW_DAYS
}

fn default_recent_movements_limit() -> usize {
    DEFAULT_RECENT_MOVEMENTS_LIMIT
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: default_low_stock_threshold(),
            recent_window_days: default_recent_window_days(),
            recent_movements_limit: default_recent_movements_limit(),
        }
    }
}

/// `[security]` section: argon2 cost parameters for new hashes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySettings {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    Params::DEFAULT_P_COST
}

impl Default for SecuritySettings {
    fn default() -> Self {
        SecuritySettings {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl SecuritySettings {
    pub fn params(&self) -> ConfigResult<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| ConfigError::Invalid(format!("argon2 parameters: {}", e)))
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub security: SecuritySettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `stockroom.toml` in the platform
    ///    config directory; a missing file is not an error)
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = AppConfig::default();

        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);
        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let db = &self.database;
        if db.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::Invalid(
                "min_connections must not exceed max_connections".into(),
            ));
        }

        let inventory = &self.inventory;
        if inventory.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "low_stock_threshold must not be negative".into(),
            ));
        }
        if !(1..=MAX_RECENT_WINDOW_DAYS).contains(&inventory.recent_window_days) {
            return Err(ConfigError::Invalid(format!(
                "recent_window_days must be between 1 and {MAX_RECENT_WINDOW_DAYS}"
            )));
        }
        if inventory.recent_movements_limit == 0 {
            return Err(ConfigError::Invalid(
                "recent_movements_limit must be greater than 0".into(),
            ));
        }

        self.security.params()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("STOCKROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(value) = var("STOCKROOM_LOW_STOCK_THRESHOLD") {
            match value.parse::<i64>() {
                Ok(threshold) => self.inventory.low_stock_threshold = threshold,
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKROOM_LOW_STOCK_THRESHOLD"),
            }
        }

        if let Some(value) = var("STOCKROOM_RECENT_WINDOW_DAYS") {
            match value.parse::<i64>() {
                Ok(days) => self.inventory.recent_window_days = days,
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKROOM_RECENT_WINDOW_DAYS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "stockroom", "stockroom")
}
