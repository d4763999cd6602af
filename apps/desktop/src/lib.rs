//! # Stockroom Desktop Library
//!
//! Use-case layer behind the Stockroom desktop front end: configuration,
//! application state, password hashing, and one command per use case.
//!
//! ## Module Organization
//! ```text
//! stockroom_desktop/
//! ├── lib.rs          ◄─── You are here (startup & tracing)
//! ├── auth.rs         ◄─── argon2 password hashing
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── app.rs      ◄─── AppState (repositories, config, passwords)
//! │   └── config.rs   ◄─── AppConfig (stockroom.toml + STOCKROOM_* env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports, history helper
//! │   ├── auth.rs     ◄─── authenticate
//! │   ├── user.rs     ◄─── user directory
//! │   ├── product.rs  ◄─── products
//! │   ├── supplier.rs ◄─── suppliers
//! │   ├── category.rs ◄─── categories
//! │   ├── movement.rs ◄─── stock entries / exits
//! │   ├── history.rs  ◄─── audit log
//! │   ├── dashboard.rs◄─── KPIs
//! │   └── config.rs   ◄─── configuration view
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let state = stockroom_desktop::start(None).await?;
//! let login = commands::auth::authenticate(&state, "admin@stock.local", "secret").await?;
//! let dashboard = commands::dashboard::get_dashboard(&state, &login.session).await?;
//! ```

pub mod auth;
pub mod commands;
pub mod error;
pub mod state;

use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppConfig, AppState, StartupError};

/// Brings the application up.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info, stockroom=debug, can be overridden with RUST_LOG   │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → stockroom.toml → STOCKROOM_* env → validate            │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • Linux: ~/.local/share/stockroom/stockroom.db                      │
/// │     • SQLite with WAL mode, foreign keys on                             │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Build AppState ───────────────────────────────────────────────────► │
/// │     • Repositories over the pool                                        │
/// │     • PasswordService from [security]                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn start(config_path: Option<&Path>) -> Result<AppState, StartupError> {
    init_tracing();

    info!("Starting Stockroom");

    let config = AppConfig::load(config_path)?;
    let db_path = config.database.resolved_path();
    info!(?db_path, "Database path determined");

    AppState::open(config).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom=trace` - Show trace for stockroom crates only
/// - Default: `info,stockroom=debug,sqlx=warn`
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
