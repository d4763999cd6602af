//! Contract tests run against both backends.

use chrono::{Duration, Utc};

use stockroom_core::{
    Category, HistoryAction, HistoryRecord, NewCategory, NewProduct, NewStockEntry, NewStockExit,
    NewSupplier, NewUser, Product, Role, SearchQuery, Supplier, User, MAX_STOCK_QUANTITY,
};

use crate::{Database, DbConfig, DbError, MemoryStore, Repositories};

async fn backends() -> Vec<(&'static str, Repositories)> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    vec![
        ("sqlite", db.repositories()),
        ("memory", MemoryStore::new().repositories()),
    ]
}

fn query(q: &str) -> SearchQuery {
    SearchQuery::parse(q).unwrap().unwrap()
}

fn category(name: &str) -> Category {
    NewCategory {
        name: name.to_string(),
        description: format!("{name} items"),
    }
    .into_category()
}

fn supplier(name: &str) -> Supplier {
    NewSupplier {
        name: name.to_string(),
        contact: "0341234567".to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        address: "Antananarivo".to_string(),
    }
    .into_supplier()
}

fn product(name: &str, category_id: Option<&str>, supplier_id: Option<&str>, qty: i64) -> Product {
    NewProduct {
        name: name.to_string(),
        reference: format!("REF-{name}"),
        category_id: category_id.map(str::to_string),
        supplier_id: supplier_id.map(str::to_string),
        quantity: qty,
        unit_price_cents: 10_000,
    }
    .into_product()
}

fn user(name: &str, surname: &str, email: &str) -> User {
    NewUser {
        name: name.to_string(),
        surname: surname.to_string(),
        email: email.to_string(),
        role: Role::User,
        password: "unused".to_string(),
    }
    .into_user()
}

#[tokio::test]
async fn test_get_update_delete_unknown_id() {
    for (backend, repos) in backends().await {
        assert!(repos.products.get("missing").await.unwrap().is_none(), "{backend}");

        let ghost = product("Ghost", None, None, 1);
        assert!(
            matches!(repos.products.update(&ghost).await, Err(DbError::NotFound { .. })),
            "{backend}"
        );
        assert!(
            matches!(repos.suppliers.delete("missing").await, Err(DbError::NotFound { .. })),
            "{backend}"
        );
        assert!(
            matches!(repos.categories.delete("missing").await, Err(DbError::NotFound { .. })),
            "{backend}"
        );
        assert!(
            matches!(repos.users.delete("missing").await, Err(DbError::NotFound { .. })),
            "{backend}"
        );
    }
}

#[tokio::test]
async fn test_product_view_resolves_current_names() {
    for (backend, repos) in backends().await {
        let mut cat = category("Informatique");
        let sup = supplier("Fournisseur A");
        repos.categories.insert(&cat).await.unwrap();
        repos.suppliers.insert(&sup).await.unwrap();

        let p = product("Prod1", Some(&cat.id), Some(&sup.id), 10);
        repos.products.insert(&p).await.unwrap();

        let view = repos.products.get_view(&p.id).await.unwrap().unwrap();
        assert_eq!(view.product.id, p.id, "{backend}");
        assert_eq!(view.product.quantity, 10, "{backend}");
        assert_eq!(view.category_name.as_deref(), Some("Informatique"), "{backend}");
        assert_eq!(view.supplier_name.as_deref(), Some("Fournisseur A"), "{backend}");

        cat.name = "IT".to_string();
        repos.categories.update(&cat).await.unwrap();
        let view = repos.products.get_view(&p.id).await.unwrap().unwrap();
        assert_eq!(view.category_name.as_deref(), Some("IT"), "{backend}");
    }
}

#[tokio::test]
async fn test_deleting_category_or_supplier_clears_reference() {
    for (backend, repos) in backends().await {
        let cat = category("Bureau");
        let sup = supplier("Fournisseur B");
        repos.categories.insert(&cat).await.unwrap();
        repos.suppliers.insert(&sup).await.unwrap();
        let p = product("Stylo", Some(&cat.id), Some(&sup.id), 3);
        repos.products.insert(&p).await.unwrap();

        repos.categories.delete(&cat.id).await.unwrap();
        repos.suppliers.delete(&sup.id).await.unwrap();

        let stored = repos.products.get(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.category_id, None, "{backend}");
        assert_eq!(stored.supplier_id, None, "{backend}");
        assert!(repos.categories.list().await.unwrap().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn test_product_with_unknown_category_rejected() {
    for (backend, repos) in backends().await {
        let p = product("Orphan", Some("no-such-category"), None, 1);
        assert!(
            matches!(
                repos.products.insert(&p).await,
                Err(DbError::ForeignKeyViolation { .. })
            ),
            "{backend}"
        );
        assert!(repos.products.list().await.unwrap().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn test_adjust_quantity_never_goes_negative() {
    for (backend, repos) in backends().await {
        let p = product("Prod1", None, None, 10);
        repos.products.insert(&p).await.unwrap();

        assert!(repos.products.adjust_quantity(&p.id, 5).await.unwrap(), "{backend}");
        assert!(!repos.products.adjust_quantity(&p.id, -20).await.unwrap(), "{backend}");
        assert_eq!(repos.products.get(&p.id).await.unwrap().unwrap().quantity, 15);

        assert!(repos.products.adjust_quantity(&p.id, -15).await.unwrap(), "{backend}");
        assert_eq!(repos.products.get(&p.id).await.unwrap().unwrap().quantity, 0);

        assert!(
            matches!(
                repos.products.adjust_quantity("missing", 1).await,
                Err(DbError::NotFound { .. })
            ),
            "{backend}"
        );
    }
}

#[tokio::test]
async fn test_adjust_quantity_refuses_overflow() {
    for (backend, repos) in backends().await {
        let full = product("Full", None, None, MAX_STOCK_QUANTITY);
        repos.products.insert(&full).await.unwrap();

        assert!(!repos.products.adjust_quantity(&full.id, 1).await.unwrap(), "{backend}");
        assert!(repos.products.adjust_quantity(&full.id, -1).await.unwrap(), "{backend}");
        assert!(repos.products.adjust_quantity(&full.id, 1).await.unwrap(), "{backend}");

        // written straight to the store, past what validation accepts
        let huge = product("Huge", None, None, i64::MAX);
        repos.products.insert(&huge).await.unwrap();
        assert!(!repos.products.adjust_quantity(&huge.id, 1).await.unwrap(), "{backend}");
        assert!(
            !repos.products.adjust_quantity(&huge.id, i64::MAX).await.unwrap(),
            "{backend}"
        );

        let quantities: Vec<i64> = repos
            .products
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.quantity)
            .collect();
        assert_eq!(quantities, [MAX_STOCK_QUANTITY, i64::MAX], "{backend}");
    }
}

#[tokio::test]
async fn test_product_search_matches_name_reference_and_category() {
    for (backend, repos) in backends().await {
        let cat = category("Informatique");
        repos.categories.insert(&cat).await.unwrap();
        repos
            .products
            .insert(&product("Clavier", Some(&cat.id), None, 1))
            .await
            .unwrap();
        repos
            .products
            .insert(&product("Chaise", None, None, 1))
            .await
            .unwrap();

        let by_category = repos.products.search(&query("INFORMAT")).await.unwrap();
        assert_eq!(by_category.len(), 1, "{backend}");
        assert_eq!(by_category[0].product.name, "Clavier");

        let by_reference = repos.products.search(&query("ref-chai")).await.unwrap();
        assert_eq!(by_reference.len(), 1, "{backend}");
        assert_eq!(by_reference[0].product.name, "Chaise");

        let all = repos.products.search(&query("c")).await.unwrap();
        let names: Vec<&str> = all.iter().map(|v| v.product.name.as_str()).collect();
        assert_eq!(names, ["Chaise", "Clavier"], "{backend}");
    }
}

#[tokio::test]
async fn test_supplier_and_category_search() {
    for (backend, repos) in backends().await {
        repos.suppliers.insert(&supplier("Alpha")).await.unwrap();
        repos.suppliers.insert(&supplier("Beta")).await.unwrap();
        repos.categories.insert(&category("Bureau")).await.unwrap();

        let found = repos.suppliers.search(&query("BETA@EXAMPLE")).await.unwrap();
        assert_eq!(found.len(), 1, "{backend}");
        assert_eq!(found[0].name, "Beta");

        // description is "Bureau items"
        let found = repos.categories.search(&query("items")).await.unwrap();
        assert_eq!(found.len(), 1, "{backend}");
    }
}

#[tokio::test]
async fn test_users_credentials_and_password_kept_on_update() {
    for (backend, repos) in backends().await {
        let mut u = user("Nere", "Tojo", "tojo@example.com");
        repos.users.insert(&u, "$argon2id$first").await.unwrap();
        repos
            .users
            .insert(&user("Ana", "Rakoto", "ana@example.com"), "$argon2id$x")
            .await
            .unwrap();

        u.role = Role::Manager;
        repos.users.update(&u, None).await.unwrap();

        let creds = repos
            .users
            .credentials_by_email("tojo@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user.role, Role::Manager, "{backend}");
        assert_eq!(creds.password_hash, "$argon2id$first", "{backend}");

        repos.users.update(&u, Some("$argon2id$second")).await.unwrap();
        let creds = repos
            .users
            .credentials_by_email("tojo@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "$argon2id$second", "{backend}");

        assert!(repos
            .users
            .credentials_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());

        let listed: Vec<String> = repos
            .users
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.surname)
            .collect();
        assert_eq!(listed, ["Rakoto", "Tojo"], "{backend}");

        let found = repos.users.search(&query("TOJO")).await.unwrap();
        assert_eq!(found.len(), 1, "{backend}");
        assert_eq!(found[0].id, u.id);
    }
}

#[tokio::test]
async fn test_movement_views_and_search() {
    for (backend, repos) in backends().await {
        let sup = supplier("Fournisseur A");
        repos.suppliers.insert(&sup).await.unwrap();
        let p = product("Prod1", None, Some(&sup.id), 10);
        repos.products.insert(&p).await.unwrap();

        let mut entry = NewStockEntry {
            product_id: p.id.clone(),
            supplier_id: sup.id.clone(),
            quantity: 5,
            unit_cost_cents: 800,
        }
        .into_entry();
        entry.date = Utc::now() - Duration::days(1);
        repos.entries.insert(&entry).await.unwrap();

        let exit = NewStockExit {
            product_id: p.id.clone(),
            quantity: 2,
            destination: "Magasin Nord".to_string(),
        }
        .into_exit();
        repos.exits.insert(&exit).await.unwrap();

        let entries = repos.entries.list_views().await.unwrap();
        assert_eq!(entries.len(), 1, "{backend}");
        assert_eq!(entries[0].product_name.as_deref(), Some("Prod1"));
        assert_eq!(entries[0].supplier_name.as_deref(), Some("Fournisseur A"));

        let by_supplier = repos.entries.search(&query("fournisseur")).await.unwrap();
        assert_eq!(by_supplier.len(), 1, "{backend}");

        let year = entry.date.format("%Y-%m").to_string();
        let by_date = repos.entries.search(&query(&year)).await.unwrap();
        assert_eq!(by_date.len(), 1, "{backend}");

        let by_destination = repos.exits.search(&query("nord")).await.unwrap();
        assert_eq!(by_destination.len(), 1, "{backend}");
        assert_eq!(by_destination[0].exit.id, exit.id);

        // Movement rows outlive the product they mention
        repos.products.delete(&p.id).await.unwrap();
        let exits = repos.exits.list_views().await.unwrap();
        assert_eq!(exits.len(), 1, "{backend}");
        assert_eq!(exits[0].product_name, None, "{backend}");
    }
}

#[tokio::test]
async fn test_history_is_listed_newest_first() {
    for (backend, repos) in backends().await {
        let mut older = HistoryRecord::new(HistoryAction::ProductAdded, "Product: Prod1");
        older.timestamp = Utc::now() - Duration::minutes(5);
        let newer = HistoryRecord::new(HistoryAction::StockExit, "Quantity: 15").product("p1");

        repos.history.append(&older).await.unwrap();
        repos.history.append(&newer).await.unwrap();

        let records = repos.history.list().await.unwrap();
        assert_eq!(records.len(), 2, "{backend}");
        assert_eq!(records[0].id, newer.id, "{backend}");
        assert_eq!(records[0].product_id.as_deref(), Some("p1"));

        let found = repos.history.search(&query("stock EXIT")).await.unwrap();
        assert_eq!(found.len(), 1, "{backend}");
        assert_eq!(found[0].id, newer.id);
    }
}
