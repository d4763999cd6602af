//! # Product Commands
//!
//! Product CRUD and search. Products are returned as [`ProductView`]s so the
//! front end gets the current category and supplier names.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  User types "  Inform "                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SearchQuery::parse → trimmed, lowercased, ≤ 100 chars                  │
//! │       │                                                                 │
//! │       ├── empty ──► list_views() (every product, by name)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  substring match on name, reference, category name                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ProductView> to the product table                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;
use tracing::{debug, info};

use stockroom_core::{
    HistoryAction, HistoryRecord, NewProduct, ProductPatch, ProductView, SearchQuery, Session,
};

use super::record_history;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Checks that referenced category and supplier exist.
async fn ensure_references(
    state: &AppState,
    category_id: Option<&str>,
    supplier_id: Option<&str>,
) -> ApiResult<()> {
    if let Some(id) = category_id {
        if state.repos().categories.get(id).await?.is_none() {
            return Err(ApiError::not_found("Category", id));
        }
    }
    if let Some(id) = supplier_id {
        if state.repos().suppliers.get(id).await?.is_none() {
            return Err(ApiError::not_found("Supplier", id));
        }
    }
    Ok(())
}

async fn load_view(state: &AppState, id: &str) -> ApiResult<ProductView> {
    state
        .repos()
        .products
        .get_view(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn add_product(
    state: &AppState,
    session: &Session,
    input: NewProduct,
) -> ApiResult<ProductView> {
    let start = Instant::now();
    debug!(name = %input.name, "add_product command");

    input.validate()?;
    ensure_references(
        state,
        input.category_id.as_deref(),
        input.supplier_id.as_deref(),
    )
    .await?;
    let product = input.into_product();

    state.repos().products.insert(&product).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::ProductAdded, format!("Product: {}", product.name))
            .product(&product.id)
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        product_id = %product.id,
        quantity = product.quantity,
        "Product added"
    );
    load_view(state, &product.id).await
}

/// Merges `patch` into the stored product. Direct edits may set any
/// quantity in `0..=MAX_STOCK_QUANTITY`.
pub async fn update_product(
    state: &AppState,
    session: &Session,
    id: &str,
    patch: ProductPatch,
) -> ApiResult<ProductView> {
    let start = Instant::now();
    debug!(id = %id, "update_product command");

    patch.validate()?;
    let mut product = state
        .repos()
        .products
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    product.apply(&patch);
    ensure_references(
        state,
        product.category_id.as_deref(),
        product.supplier_id.as_deref(),
    )
    .await?;

    state.repos().products.update(&product).await?;
    record_history(
        state,
        HistoryRecord::new(
            HistoryAction::ProductUpdated,
            format!("Product updated: {}", product.name),
        )
        .product(&product.id)
        .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        product_id = %product.id,
        "Product updated"
    );
    load_view(state, &product.id).await
}

/// Deletes a product. Its past entries and exits stay in the log.
pub async fn delete_product(state: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let start = Instant::now();
    debug!(id = %id, "delete_product command");

    let product = state
        .repos()
        .products
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    state.repos().products.delete(id).await?;
    record_history(
        state,
        HistoryRecord::new(
            HistoryAction::ProductDeleted,
            format!("Product deleted: {}", product.name),
        )
        .product(id)
        .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        product_id = %id,
        "Product deleted"
    );
    Ok(())
}

pub async fn get_product(state: &AppState, session: &Session, id: &str) -> ApiResult<ProductView> {
    debug!(id = %id, by = %session.user_id, "get_product command");
    load_view(state, id).await
}

pub async fn list_products(state: &AppState, session: &Session) -> ApiResult<Vec<ProductView>> {
    debug!(by = %session.user_id, "list_products command");
    Ok(state.repos().products.list_views().await?)
}

/// Matches name, reference and category name.
pub async fn search_products(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<ProductView>> {
    let start = Instant::now();
    debug!(query = %query, by = %session.user_id, "search_products command");

    let products = match SearchQuery::parse(query)? {
        Some(q) => state.repos().products.search(&q).await?,
        None => state.repos().products.list_views().await?,
    };

    debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = products.len(),
        "search_products complete"
    );
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::category::add_category;
    use crate::commands::history::list_history;
    use crate::commands::testing::memory_state;
    use crate::error::ErrorCode;
    use stockroom_core::{CategoryPatch, NewCategory, MAX_STOCK_QUANTITY};

    fn new_product(name: &str, category_id: Option<&str>, qty: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            reference: format!("REF-{name}"),
            category_id: category_id.map(str::to_string),
            supplier_id: None,
            quantity: qty,
            unit_price_cents: 1_500,
        }
    }

    #[tokio::test]
    async fn test_crud_appends_one_record_each() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        let view = add_product(&state, &session, new_product("Prod1", None, 10))
            .await
            .unwrap();
        let id = view.product.id.clone();

        let patch = ProductPatch {
            quantity: Some(7),
            ..ProductPatch::default()
        };
        let view = update_product(&state, &session, &id, patch).await.unwrap();
        assert_eq!(view.product.quantity, 7);

        delete_product(&state, &session, &id).await.unwrap();
        assert_eq!(
            get_product(&state, &session, &id).await.unwrap_err().code,
            ErrorCode::NotFound
        );

        let history = list_history(&state, &session).await.unwrap();
        assert_eq!(history.len(), before + 3);
        assert!(history
            .iter()
            .take(3)
            .all(|h| h.product_id.as_deref() == Some(id.as_str())));
    }

    #[tokio::test]
    async fn test_rejects_invalid_input_without_writing() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        for qty in [-1, MAX_STOCK_QUANTITY + 1, i64::MAX] {
            let err = add_product(&state, &session, new_product("Bad", None, qty))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }

        let err = add_product(&state, &session, new_product("Orphan", Some("nope"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_product(&state, &session, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(list_products(&state, &session).await.unwrap().is_empty());
        assert_eq!(list_history(&state, &session).await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_view_follows_category_rename() {
        let (state, session) = memory_state().await;
        let category = add_category(
            &state,
            &session,
            NewCategory {
                name: "Informatique".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        let view = add_product(&state, &session, new_product("Clavier", Some(&category.id), 4))
            .await
            .unwrap();
        assert_eq!(view.category_name.as_deref(), Some("Informatique"));

        crate::commands::category::update_category(
            &state,
            &session,
            &category.id,
            CategoryPatch {
                name: Some("IT".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();

        let found = search_products(&state, &session, "it").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category_name.as_deref(), Some("IT"));
    }

    #[tokio::test]
    async fn test_clearing_category_reference() {
        let (state, session) = memory_state().await;
        let category = add_category(
            &state,
            &session,
            NewCategory {
                name: "Bureau".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        let view = add_product(&state, &session, new_product("Stylo", Some(&category.id), 4))
            .await
            .unwrap();

        let id = view.product.id.clone();

        // name only: the category stays
        let patch: ProductPatch = serde_json::from_str(r#"{"name": "Stylo bleu"}"#).unwrap();
        let view = update_product(&state, &session, &id, patch).await.unwrap();
        assert_eq!(view.category_name.as_deref(), Some("Bureau"));

        let patch: ProductPatch = serde_json::from_str(r#"{"categoryId": null}"#).unwrap();
        let view = update_product(&state, &session, &id, patch).await.unwrap();
        assert_eq!(view.product.name, "Stylo bleu");
        assert_eq!(view.product.category_id, None);
        assert_eq!(view.category_name, None);
    }

    #[tokio::test]
    async fn test_empty_search_lists_all() {
        let (state, session) = memory_state().await;
        add_product(&state, &session, new_product("B", None, 1)).await.unwrap();
        add_product(&state, &session, new_product("A", None, 1)).await.unwrap();

        let all = search_products(&state, &session, "   ").await.unwrap();
        assert_eq!(all, list_products(&state, &session).await.unwrap());
        assert_eq!(all[0].product.name, "A");

        let too_long = "x".repeat(101);
        let err = search_products(&state, &session, &too_long).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
