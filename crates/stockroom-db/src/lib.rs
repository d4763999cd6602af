//! # stockroom-db: Store Layer for Stockroom
//!
//! Repository traits for every collection, implemented over SQLite (sqlx)
//! and over process memory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  desktop command (record_exit)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                  stockroom-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │───►│  users         │    │  (embedded)  │   │    │
//! │  │   │               │    │  products      │    │              │   │    │
//! │  │   │ SqlitePool    │    │  entries/exits │    │ 001_initial  │   │    │
//! │  │   └───────────────┘    │  history ...   │    └──────────────┘   │    │
//! │  │   ┌───────────────┐    │                │                       │    │
//! │  │   │  MemoryStore  │───►│                │                       │    │
//! │  │   └───────────────┘    └────────────────┘                       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (stockroom.db)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository traits and both implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockroom.db")).await?;
//! let repos = db.repositories();
//! let low = repos.products.list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    CategoryRepository, HistoryRepository, MemoryStore, ProductRepository, Repositories,
    StockEntryRepository, StockExitRepository, SupplierRepository, UserCredentials,
    UserRepository,
};

#[cfg(test)]
mod tests;
