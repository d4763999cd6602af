//! # State Module
//!
//! Application state handed to every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppConfig::load(None)  ──►  AppState::open(config)                     │
//! │                                     │                                   │
//! │          ┌──────────────────────────┼──────────────────┐                │
//! │          ▼                          ▼                  ▼                │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐           │
//! │  │ Repositories │  │ PasswordService  │  │    AppConfig     │           │
//! │  │              │  │                  │  │                  │           │
//! │  │ Arc<dyn ..>  │  │  argon2 params   │  │  [database]      │           │
//! │  │ per          │  │  from [security] │  │  [inventory]     │           │
//! │  │ collection   │  │                  │  │  [security]      │           │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘           │
//! │                                                                         │
//! │  The logged-in user is NOT part of the state: commands take a           │
//! │  `Session` argument instead.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod config;

pub use app::{AppState, StartupError};
pub use config::{
    AppConfig, ConfigError, ConfigResult, DatabaseSettings, InventorySettings, SecuritySettings,
};
