//! # Dashboard Commands
//!
//! Uncached aggregates over the current store contents. Everything is
//! summed in Rust by `stockroom_core::kpi`; the store only lists rows.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Products: 42     Rupture: 3     Entries (30d): 17   Exits: 9 │
//! ├───────────────────────────────┬───────────────────────────────┤
//! │  Stock by category            │  Low stock (< 50)             │
//! │  Informatique ████████ 120    │  Prod7    0                   │
//! │  Bureau       ███      40     │  Prod3   12                   │
//! ├───────────────────────────────┴───────────────────────────────┤
//! │  Recent movements (10, newest first)                          │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

use stockroom_core::kpi::{self, CategoryStock, Dashboard, Kpi, Movement};
use stockroom_core::{Product, Session};

use crate::error::ApiResult;
use crate::state::AppState;

/// Product count, out-of-stock count, and movements in the trailing window.
pub async fn get_kpi(state: &AppState, session: &Session) -> ApiResult<Kpi> {
    debug!(by = %session.user_id, "get_kpi command");
    let repos = state.repos();
    let products = repos.products.list().await?;
    let entries = repos.entries.list().await?;
    let exits = repos.exits.list().await?;

    Ok(kpi::compute_kpi(
        &products,
        &entries,
        &exits,
        Utc::now(),
        state.config().inventory.recent_window_days,
    ))
}

/// Total quantity per category; every category is listed.
pub async fn get_stock_by_category(
    state: &AppState,
    session: &Session,
) -> ApiResult<Vec<CategoryStock>> {
    debug!(by = %session.user_id, "get_stock_by_category command");
    let categories = state.repos().categories.list().await?;
    let products = state.repos().products.list().await?;
    Ok(kpi::stock_by_category(&categories, &products))
}

/// Products below the configured threshold, lowest first.
pub async fn get_low_stock(state: &AppState, session: &Session) -> ApiResult<Vec<Product>> {
    debug!(by = %session.user_id, "get_low_stock command");
    let products = state.repos().products.list().await?;
    Ok(kpi::low_stock(
        &products,
        state.config().inventory.low_stock_threshold,
    ))
}

pub async fn get_recent_movements(state: &AppState, session: &Session) -> ApiResult<Vec<Movement>> {
    debug!(by = %session.user_id, "get_recent_movements command");
    let repos = state.repos();
    let products = repos.products.list().await?;
    let entries = repos.entries.list().await?;
    let exits = repos.exits.list().await?;
    Ok(kpi::recent_movements(
        &entries,
        &exits,
        &products,
        state.config().inventory.recent_movements_limit,
    ))
}

/// Everything the dashboard screen shows, from one read of each collection.
pub async fn get_dashboard(state: &AppState, session: &Session) -> ApiResult<Dashboard> {
    let start = Instant::now();
    debug!(by = %session.user_id, "get_dashboard command");

    let repos = state.repos();
    let inventory = &state.config().inventory;
    let products = repos.products.list().await?;
    let categories = repos.categories.list().await?;
    let entries = repos.entries.list().await?;
    let exits = repos.exits.list().await?;

    let dashboard = Dashboard {
        kpi: kpi::compute_kpi(
            &products,
            &entries,
            &exits,
            Utc::now(),
            inventory.recent_window_days,
        ),
        stock_by_category: kpi::stock_by_category(&categories, &products),
        low_stock: kpi::low_stock(&products, inventory.low_stock_threshold),
        recent_movements: kpi::recent_movements(
            &entries,
            &exits,
            &products,
            inventory.recent_movements_limit,
        ),
    };

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        products = dashboard.kpi.total_products,
        out_of_stock = dashboard.kpi.out_of_stock,
        "Dashboard computed"
    );
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::category::add_category;
    use crate::commands::history::list_history;
    use crate::commands::movement::{record_entry, record_exit};
    use crate::commands::product::{add_product, get_product};
    use crate::commands::supplier::add_supplier;
    use crate::commands::testing::{memory_state, seed_admin, test_config};
    use crate::error::ErrorCode;
    use stockroom_core::{
        MovementKind, NewCategory, NewProduct, NewStockEntry, NewStockExit, NewSupplier,
    };
    use stockroom_db::{Database, DbConfig};

    async fn product(
        state: &AppState,
        session: &Session,
        name: &str,
        category: Option<&str>,
        qty: i64,
    ) -> String {
        add_product(
            state,
            session,
            NewProduct {
                name: name.to_string(),
                reference: String::new(),
                category_id: category.map(str::to_string),
                supplier_id: None,
                quantity: qty,
                unit_price_cents: 100,
            },
        )
        .await
        .unwrap()
        .product
        .id
    }

    #[tokio::test]
    async fn test_dashboard_aggregates() {
        let (state, session) = memory_state().await;
        let it = add_category(
            &state,
            &session,
            NewCategory {
                name: "Informatique".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        add_category(
            &state,
            &session,
            NewCategory {
                name: "Vide".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();

        product(&state, &session, "Clavier", Some(&it.id), 30).await;
        product(&state, &session, "Souris", Some(&it.id), 70).await;
        let empty = product(&state, &session, "Ecran", None, 1).await;
        record_exit(
            &state,
            &session,
            NewStockExit {
                product_id: empty.clone(),
                quantity: 1,
                destination: String::new(),
            },
        )
        .await
        .unwrap();

        let dashboard = get_dashboard(&state, &session).await.unwrap();
        assert_eq!(dashboard.kpi.total_products, 3);
        assert_eq!(dashboard.kpi.out_of_stock, 1);
        assert_eq!(dashboard.kpi.recent_exits, 1);
        assert_eq!(dashboard.kpi.recent_entries, 0);

        let by_category: Vec<(&str, i64)> = dashboard
            .stock_by_category
            .iter()
            .map(|c| (c.category_name.as_str(), c.quantity))
            .collect();
        assert_eq!(by_category, [("Informatique", 100), ("Vide", 0)]);

        let low: Vec<&str> = dashboard.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(low, ["Ecran", "Clavier"]);

        assert_eq!(dashboard.recent_movements.len(), 1);
        assert_eq!(dashboard.recent_movements[0].kind, MovementKind::Exit);
        assert_eq!(dashboard.recent_movements[0].product_name.as_deref(), Some("Ecran"));

        assert_eq!(get_kpi(&state, &session).await.unwrap(), dashboard.kpi);
        assert_eq!(
            get_low_stock(&state, &session).await.unwrap(),
            dashboard.low_stock
        );
        assert_eq!(
            get_stock_by_category(&state, &session).await.unwrap(),
            dashboard.stock_by_category
        );
        assert_eq!(
            get_recent_movements(&state, &session).await.unwrap(),
            dashboard.recent_movements
        );
    }

    #[tokio::test]
    async fn test_threshold_comes_from_config() {
        let mut config = test_config();
        config.inventory.low_stock_threshold = 5;
        let state = AppState::in_memory(config).unwrap();
        let session = seed_admin(&state).await;

        product(&state, &session, "A", None, 4).await;
        product(&state, &session, "B", None, 5).await;

        let low = get_low_stock(&state, &session).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "A");
    }

    #[tokio::test]
    async fn test_stock_scenario_on_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.repositories(), test_config()).unwrap();
        let session = seed_admin(&state).await;

        let supplier = add_supplier(
            &state,
            &session,
            NewSupplier {
                name: "Fournisseur A".to_string(),
                contact: String::new(),
                email: "a@fournisseur.mg".to_string(),
                address: String::new(),
            },
        )
        .await
        .unwrap();
        let prod1 = product(&state, &session, "Prod1", None, 10).await;

        record_entry(
            &state,
            &session,
            NewStockEntry {
                product_id: prod1.clone(),
                supplier_id: supplier.id.clone(),
                quantity: 5,
                unit_cost_cents: 900,
            },
        )
        .await
        .unwrap();
        assert_eq!(get_product(&state, &session, &prod1).await.unwrap().product.quantity, 15);

        let exit = |qty| NewStockExit {
            product_id: prod1.clone(),
            quantity: qty,
            destination: "Sale".to_string(),
        };
        let err = record_exit(&state, &session, exit(20)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_product(&state, &session, &prod1).await.unwrap().product.quantity, 15);

        record_exit(&state, &session, exit(15)).await.unwrap();
        assert_eq!(get_product(&state, &session, &prod1).await.unwrap().product.quantity, 0);

        let kpi = get_kpi(&state, &session).await.unwrap();
        assert_eq!(kpi.total_products, 1);
        assert_eq!(kpi.out_of_stock, 1);
        assert_eq!(kpi.recent_entries, 1);
        assert_eq!(kpi.recent_exits, 1);

        // user added, supplier added, product added, entry, exit
        let history = list_history(&state, &session).await.unwrap();
        assert_eq!(history.len(), 5);
        let stock_records = history
            .iter()
            .filter(|h| h.product_id.as_deref() == Some(prod1.as_str()))
            .count();
        assert_eq!(stock_records, 3);
    }
}
