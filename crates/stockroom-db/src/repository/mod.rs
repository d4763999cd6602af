//! # Repository Module
//!
//! One repository trait per collection, with two interchangeable backends.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Injection                                      │
//! │                                                                         │
//! │  desktop command                                                        │
//! │       │  state.repos.products.search(&query)                            │
//! │       ▼                                                                 │
//! │  Repositories { users, products, suppliers, categories,                 │
//! │                 entries, exits, history }      (Arc<dyn Trait> each)    │
//! │       │                                                                 │
//! │       ├──────────────────────────┬─────────────────────────────┐        │
//! │       ▼                          ▼                             │        │
//! │  SqliteProductRepository    MemoryProductRepository            │        │
//! │  (Database::repositories)   (MemoryStore::repositories)        │        │
//! │       │                          │                             │        │
//! │       ▼                          ▼                             │        │
//! │  SQLite file / :memory:     Arc<Mutex<Collections>>            │        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract Shared by Both Backends
//! - `get` returns `Ok(None)` for an unknown id
//! - `update` / `delete` of an unknown id return [`DbError::NotFound`]
//! - lists are ordered: people by surname then name, catalogue records by
//!   name, movements and history newest first
//! - `search` is a case-insensitive substring match over the fields listed
//!   on each trait
//! - deleting a category or supplier clears the reference on its products
//!
//! [`DbError::NotFound`]: crate::error::DbError::NotFound

use async_trait::async_trait;
use std::sync::Arc;

use stockroom_core::{
    Category, HistoryRecord, Product, ProductView, SearchQuery, StockEntry, StockEntryView,
    StockExit, StockExitView, Supplier, User,
};

use crate::error::DbResult;

pub mod category;
pub mod history;
pub mod memory;
pub mod movement;
pub mod product;
pub mod supplier;
pub mod user;

pub use memory::MemoryStore;

// =============================================================================
// Credentials
// =============================================================================

/// A user row together with its password hash.
///
/// Only the login path reads this; every other read returns plain [`User`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

// =============================================================================
// Traits
// =============================================================================

/// Users. Search fields: name, surname, email.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User, password_hash: &str) -> DbResult<()>;

    async fn get(&self, id: &str) -> DbResult<Option<User>>;

    /// First user with this exact email, with its hash.
    async fn credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>>;

    /// Writes every field of `user`; the hash only when `password_hash` is set.
    async fn update(&self, user: &User, password_hash: Option<&str>) -> DbResult<()>;

    async fn delete(&self, id: &str) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<User>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<User>>;
}

/// Products. Search fields: name, reference, category name.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> DbResult<()>;

    async fn get(&self, id: &str) -> DbResult<Option<Product>>;

    async fn get_view(&self, id: &str) -> DbResult<Option<ProductView>>;

    async fn update(&self, product: &Product) -> DbResult<()>;

    async fn delete(&self, id: &str) -> DbResult<()>;

    /// Raw rows, for aggregation.
    async fn list(&self) -> DbResult<Vec<Product>>;

    async fn list_views(&self) -> DbResult<Vec<ProductView>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<ProductView>>;

    /// Adds `delta` to the on-hand quantity unless the result would fall
    /// outside `0..=MAX_STOCK_QUANTITY`.
    ///
    /// Returns `Ok(false)` when the guard refused the change and
    /// `DbError::NotFound` when the product does not exist.
    async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<bool>;
}

/// Suppliers. Search fields: name, email, contact.
#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn insert(&self, supplier: &Supplier) -> DbResult<()>;

    async fn get(&self, id: &str) -> DbResult<Option<Supplier>>;

    async fn update(&self, supplier: &Supplier) -> DbResult<()>;

    async fn delete(&self, id: &str) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<Supplier>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Supplier>>;
}

/// Categories. Search fields: name, description.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: &Category) -> DbResult<()>;

    async fn get(&self, id: &str) -> DbResult<Option<Category>>;

    async fn update(&self, category: &Category) -> DbResult<()>;

    async fn delete(&self, id: &str) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<Category>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Category>>;
}

/// Stock entries. Search fields: product name, supplier name, date text.
#[async_trait]
pub trait StockEntryRepository: Send + Sync {
    async fn insert(&self, entry: &StockEntry) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<StockEntry>>;

    async fn list_views(&self) -> DbResult<Vec<StockEntryView>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockEntryView>>;
}

/// Stock exits. Search fields: product name, destination, date text.
#[async_trait]
pub trait StockExitRepository: Send + Sync {
    async fn insert(&self, exit: &StockExit) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<StockExit>>;

    async fn list_views(&self) -> DbResult<Vec<StockExitView>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockExitView>>;
}

/// Append-only audit log. Search fields: action, details.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, record: &HistoryRecord) -> DbResult<()>;

    async fn list(&self) -> DbResult<Vec<HistoryRecord>>;

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<HistoryRecord>>;
}

// =============================================================================
// Bundle
// =============================================================================

/// Every repository behind one cloneable handle.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub suppliers: Arc<dyn SupplierRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub entries: Arc<dyn StockEntryRepository>,
    pub exits: Arc<dyn StockExitRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
