//! # In-Memory Store
//!
//! A [`Repositories`] backend that keeps every collection in process memory.
//! Used by the use-case tests and for throwaway sessions; it follows the
//! same contract as the SQLite backend, including the "clear the reference
//! on delete" behaviour of the product foreign keys.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore { inner: Arc<Mutex<Collections>> }                         │
//! │       │                                                                 │
//! │       ├── MemoryUserRepository(store.clone())                           │
//! │       ├── MemoryProductRepository(store.clone())                        │
//! │       └── ...                                                           │
//! │                                                                         │
//! │  Every repository call takes the lock once, does its whole read or      │
//! │  write under it and releases it before returning. Nothing is awaited    │
//! │  while the lock is held.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::{Arc, Mutex};

use stockroom_core::{
    Category, HistoryRecord, Product, ProductView, SearchQuery, StockEntry, StockEntryView,
    StockExit, StockExitView, Supplier, User, MAX_STOCK_QUANTITY,
};

use super::{
    CategoryRepository, HistoryRepository, ProductRepository, Repositories, StockEntryRepository,
    StockExitRepository, SupplierRepository, UserCredentials, UserRepository,
};
use crate::error::{DbError, DbResult};

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Collections {
    users: Vec<UserCredentials>,
    products: Vec<Product>,
    suppliers: Vec<Supplier>,
    categories: Vec<Category>,
    entries: Vec<StockEntry>,
    exits: Vec<StockExit>,
    history: Vec<HistoryRecord>,
}

/// Shared handle to the in-memory collections. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the repository bundle over this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(MemoryUserRepository(self.clone())),
            products: Arc::new(MemoryProductRepository(self.clone())),
            suppliers: Arc::new(MemorySupplierRepository(self.clone())),
            categories: Arc::new(MemoryCategoryRepository(self.clone())),
            entries: Arc::new(MemoryStockEntryRepository(self.clone())),
            exits: Arc::new(MemoryStockExitRepository(self.clone())),
            history: Arc::new(MemoryHistoryRepository(self.clone())),
        }
    }

    /// Runs `f` with exclusive access to the collections.
    fn with<T>(&self, f: impl FnOnce(&mut Collections) -> DbResult<T>) -> DbResult<T> {
        let mut collections = self
            .inner
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))?;
        f(&mut collections)
    }
}

/// Same text SQLite stores for a timestamp, so date searches agree.
fn date_text(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn replace<T>(items: &mut [T], matches: impl Fn(&T) -> bool, value: T) -> bool {
    match items.iter_mut().find(|item| matches(item)) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn remove<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

impl Collections {
    fn product_name(&self, id: &str) -> Option<String> {
        self.products.iter().find(|p| p.id == id).map(|p| p.name.clone())
    }

    fn supplier_name(&self, id: &str) -> Option<String> {
        self.suppliers.iter().find(|s| s.id == id).map(|s| s.name.clone())
    }

    fn category_name(&self, id: &str) -> Option<String> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.clone())
    }

    fn product_view(&self, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            category_name: product.category_id.as_deref().and_then(|id| self.category_name(id)),
            supplier_name: product.supplier_id.as_deref().and_then(|id| self.supplier_name(id)),
        }
    }

    fn entry_view(&self, entry: &StockEntry) -> StockEntryView {
        StockEntryView {
            entry: entry.clone(),
            product_name: self.product_name(&entry.product_id),
            supplier_name: self.supplier_name(&entry.supplier_id),
        }
    }

    fn exit_view(&self, exit: &StockExit) -> StockExitView {
        StockExitView {
            exit: exit.clone(),
            product_name: self.product_name(&exit.product_id),
        }
    }

    /// Mirrors the products table's foreign keys.
    fn check_product_refs(&self, product: &Product) -> DbResult<()> {
        if let Some(id) = product.category_id.as_deref() {
            if !self.categories.iter().any(|c| c.id == id) {
                return Err(DbError::foreign_key(format!("unknown category {id}")));
            }
        }
        if let Some(id) = product.supplier_id.as_deref() {
            if !self.suppliers.iter().any(|s| s.id == id) {
                return Err(DbError::foreign_key(format!("unknown supplier {id}")));
            }
        }
        Ok(())
    }

    fn sorted_products(&self) -> Vec<Product> {
        let mut products = self.products.clone();
        products.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        products
    }

    fn sorted_entries(&self) -> Vec<StockEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    fn sorted_exits(&self) -> Vec<StockExit> {
        let mut exits = self.exits.clone();
        exits.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        exits
    }

    fn sorted_history(&self) -> Vec<HistoryRecord> {
        let mut records = self.history.clone();
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryUserRepository(MemoryStore);

fn sorted_users(users: impl Iterator<Item = User>) -> Vec<User> {
    let mut users: Vec<User> = users.collect();
    users.sort_by(|a, b| (&a.surname, &a.name, &a.id).cmp(&(&b.surname, &b.name, &b.id)));
    users
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> DbResult<()> {
        self.0.with(|c| {
            c.users.push(UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            });
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> DbResult<Option<User>> {
        self.0.with(|c| {
            Ok(c.users
                .iter()
                .find(|u| u.user.id == id)
                .map(|u| u.user.clone()))
        })
    }

    async fn credentials_by_email(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        self.0
            .with(|c| Ok(c.users.iter().find(|u| u.user.email == email).cloned()))
    }

    async fn update(&self, user: &User, password_hash: Option<&str>) -> DbResult<()> {
        self.0.with(|c| {
            let stored = c
                .users
                .iter_mut()
                .find(|u| u.user.id == user.id)
                .ok_or_else(|| DbError::not_found("User", &user.id))?;

            stored.user = user.clone();
            if let Some(hash) = password_hash {
                stored.password_hash = hash.to_string();
            }
            Ok(())
        })
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.0.with(|c| {
            if remove(&mut c.users, |u| u.user.id == id) {
                Ok(())
            } else {
                Err(DbError::not_found("User", id))
            }
        })
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        self.0
            .with(|c| Ok(sorted_users(c.users.iter().map(|u| u.user.clone()))))
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<User>> {
        self.0.with(|c| {
            Ok(sorted_users(
                c.users
                    .iter()
                    .map(|u| &u.user)
                    .filter(|u| {
                        query.matches_any([u.name.as_str(), u.surname.as_str(), u.email.as_str()])
                    })
                    .cloned(),
            ))
        })
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryProductRepository(MemoryStore);

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn insert(&self, product: &Product) -> DbResult<()> {
        self.0.with(|c| {
            c.check_product_refs(product)?;
            c.products.push(product.clone());
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        self.0
            .with(|c| Ok(c.products.iter().find(|p| p.id == id).cloned()))
    }

    async fn get_view(&self, id: &str) -> DbResult<Option<ProductView>> {
        self.0.with(|c| {
            Ok(c.products
                .iter()
                .find(|p| p.id == id)
                .map(|p| c.product_view(p)))
        })
    }

    async fn update(&self, product: &Product) -> DbResult<()> {
        self.0.with(|c| {
            if !c.products.iter().any(|p| p.id == product.id) {
                return Err(DbError::not_found("Product", &product.id));
            }
            c.check_product_refs(product)?;
            replace(&mut c.products, |p| p.id == product.id, product.clone());
            Ok(())
        })
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.0.with(|c| {
            if remove(&mut c.products, |p| p.id == id) {
                Ok(())
            } else {
                Err(DbError::not_found("Product", id))
            }
        })
    }

    async fn list(&self) -> DbResult<Vec<Product>> {
        self.0.with(|c| Ok(c.sorted_products()))
    }

    async fn list_views(&self) -> DbResult<Vec<ProductView>> {
        self.0.with(|c| {
            Ok(c.sorted_products()
                .iter()
                .map(|p| c.product_view(p))
                .collect())
        })
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<ProductView>> {
        self.0.with(|c| {
            Ok(c.sorted_products()
                .iter()
                .map(|p| c.product_view(p))
                .filter(|v| {
                    query.matches_any([
                        v.product.name.as_str(),
                        v.product.reference.as_str(),
                        v.category_name.as_deref().unwrap_or_default(),
                    ])
                })
                .collect())
        })
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<bool> {
        self.0.with(|c| {
            let product = c
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| DbError::not_found("Product", id))?;

            match product
                .quantity
                .checked_add(delta)
                .filter(|next| (0..=MAX_STOCK_QUANTITY).contains(next))
            {
                Some(next) => {
                    product.quantity = next;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }
}

// =============================================================================
// Suppliers
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemorySupplierRepository(MemoryStore);

#[async_trait]
impl SupplierRepository for MemorySupplierRepository {
    async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        self.0.with(|c| {
            c.suppliers.push(supplier.clone());
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> DbResult<Option<Supplier>> {
        self.0
            .with(|c| Ok(c.suppliers.iter().find(|s| s.id == id).cloned()))
    }

    async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        self.0.with(|c| {
            if replace(&mut c.suppliers, |s| s.id == supplier.id, supplier.clone()) {
                Ok(())
            } else {
                Err(DbError::not_found("Supplier", &supplier.id))
            }
        })
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.0.with(|c| {
            if !remove(&mut c.suppliers, |s| s.id == id) {
                return Err(DbError::not_found("Supplier", id));
            }
            for product in c.products.iter_mut() {
                if product.supplier_id.as_deref() == Some(id) {
                    product.supplier_id = None;
                }
            }
            Ok(())
        })
    }

    async fn list(&self) -> DbResult<Vec<Supplier>> {
        self.0.with(|c| {
            let mut suppliers = c.suppliers.clone();
            suppliers.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
            Ok(suppliers)
        })
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Supplier>> {
        let mut suppliers = self.list().await?;
        suppliers.retain(|s| {
            query.matches_any([s.name.as_str(), s.email.as_str(), s.contact.as_str()])
        });
        Ok(suppliers)
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryCategoryRepository(MemoryStore);

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn insert(&self, category: &Category) -> DbResult<()> {
        self.0.with(|c| {
            c.categories.push(category.clone());
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> DbResult<Option<Category>> {
        self.0
            .with(|c| Ok(c.categories.iter().find(|cat| cat.id == id).cloned()))
    }

    async fn update(&self, category: &Category) -> DbResult<()> {
        self.0.with(|c| {
            if replace(&mut c.categories, |cat| cat.id == category.id, category.clone()) {
                Ok(())
            } else {
                Err(DbError::not_found("Category", &category.id))
            }
        })
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        self.0.with(|c| {
            if !remove(&mut c.categories, |cat| cat.id == id) {
                return Err(DbError::not_found("Category", id));
            }
            for product in c.products.iter_mut() {
                if product.category_id.as_deref() == Some(id) {
                    product.category_id = None;
                }
            }
            Ok(())
        })
    }

    async fn list(&self) -> DbResult<Vec<Category>> {
        self.0.with(|c| {
            let mut categories = c.categories.clone();
            categories.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
            Ok(categories)
        })
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<Category>> {
        let mut categories = self.list().await?;
        categories.retain(|cat| query.matches_any([cat.name.as_str(), cat.description.as_str()]));
        Ok(categories)
    }
}

// =============================================================================
// Stock Movements
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryStockEntryRepository(MemoryStore);

#[async_trait]
impl StockEntryRepository for MemoryStockEntryRepository {
    async fn insert(&self, entry: &StockEntry) -> DbResult<()> {
        self.0.with(|c| {
            c.entries.push(entry.clone());
            Ok(())
        })
    }

    async fn list(&self) -> DbResult<Vec<StockEntry>> {
        self.0.with(|c| Ok(c.sorted_entries()))
    }

    async fn list_views(&self) -> DbResult<Vec<StockEntryView>> {
        self.0
            .with(|c| Ok(c.sorted_entries().iter().map(|e| c.entry_view(e)).collect()))
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockEntryView>> {
        let mut views = self.list_views().await?;
        views.retain(|v| {
            query.matches_any([
                v.product_name.as_deref().unwrap_or_default(),
                v.supplier_name.as_deref().unwrap_or_default(),
                date_text(&v.entry.date).as_str(),
            ])
        });
        Ok(views)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStockExitRepository(MemoryStore);

#[async_trait]
impl StockExitRepository for MemoryStockExitRepository {
    async fn insert(&self, exit: &StockExit) -> DbResult<()> {
        self.0.with(|c| {
            c.exits.push(exit.clone());
            Ok(())
        })
    }

    async fn list(&self) -> DbResult<Vec<StockExit>> {
        self.0.with(|c| Ok(c.sorted_exits()))
    }

    async fn list_views(&self) -> DbResult<Vec<StockExitView>> {
        self.0
            .with(|c| Ok(c.sorted_exits().iter().map(|x| c.exit_view(x)).collect()))
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<StockExitView>> {
        let mut views = self.list_views().await?;
        views.retain(|v| {
            query.matches_any([
                v.product_name.as_deref().unwrap_or_default(),
                v.exit.destination.as_str(),
                date_text(&v.exit.date).as_str(),
            ])
        });
        Ok(views)
    }
}

// =============================================================================
// History
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryHistoryRepository(MemoryStore);

#[async_trait]
impl HistoryRepository for MemoryHistoryRepository {
    async fn append(&self, record: &HistoryRecord) -> DbResult<()> {
        self.0.with(|c| {
            c.history.push(record.clone());
            Ok(())
        })
    }

    async fn list(&self) -> DbResult<Vec<HistoryRecord>> {
        self.0.with(|c| Ok(c.sorted_history()))
    }

    async fn search(&self, query: &SearchQuery) -> DbResult<Vec<HistoryRecord>> {
        let mut records = self.list().await?;
        records.retain(|r| query.matches_any([r.action.as_str(), r.details.as_str()]));
        Ok(records)
    }
}
