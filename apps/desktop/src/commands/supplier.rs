//! # Supplier Commands
//!
//! Deleting a supplier clears it from products; stock entries keep the id.

use std::time::Instant;
use tracing::{debug, info};

use stockroom_core::{
    HistoryAction, HistoryRecord, NewSupplier, SearchQuery, Session, Supplier, SupplierPatch,
};

use super::record_history;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn add_supplier(
    state: &AppState,
    session: &Session,
    input: NewSupplier,
) -> ApiResult<Supplier> {
    let start = Instant::now();
    debug!(name = %input.name, "add_supplier command");

    input.validate()?;
    let supplier = input.into_supplier();

    state.repos().suppliers.insert(&supplier).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::SupplierAdded, format!("Supplier: {}", supplier.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        supplier_id = %supplier.id,
        "Supplier added"
    );
    Ok(supplier)
}

pub async fn update_supplier(
    state: &AppState,
    session: &Session,
    id: &str,
    patch: SupplierPatch,
) -> ApiResult<Supplier> {
    let start = Instant::now();
    debug!(id = %id, "update_supplier command");

    let mut supplier = state
        .repos()
        .suppliers
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier", id))?;
    supplier.apply(&patch);

    state.repos().suppliers.update(&supplier).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::SupplierUpdated, format!("Supplier: {}", supplier.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        supplier_id = %supplier.id,
        "Supplier updated"
    );
    Ok(supplier)
}

pub async fn delete_supplier(state: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let start = Instant::now();
    debug!(id = %id, "delete_supplier command");

    let supplier = state
        .repos()
        .suppliers
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier", id))?;

    state.repos().suppliers.delete(id).await?;
    record_history(
        state,
        HistoryRecord::new(HistoryAction::SupplierDeleted, format!("Supplier: {}", supplier.name))
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        supplier_id = %id,
        "Supplier deleted"
    );
    Ok(())
}

pub async fn list_suppliers(state: &AppState, session: &Session) -> ApiResult<Vec<Supplier>> {
    debug!(by = %session.user_id, "list_suppliers command");
    Ok(state.repos().suppliers.list().await?)
}

/// Matches name, email and contact.
pub async fn search_suppliers(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<Supplier>> {
    debug!(query = %query, by = %session.user_id, "search_suppliers command");
    let suppliers = match SearchQuery::parse(query)? {
        Some(q) => state.repos().suppliers.search(&q).await?,
        None => state.repos().suppliers.list().await?,
    };
    Ok(suppliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::history::list_history;
    use crate::commands::product::{add_product, get_product};
    use crate::commands::testing::memory_state;
    use crate::error::ErrorCode;
    use stockroom_core::NewProduct;

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            contact: "034 00 000 00".to_string(),
            email: format!("{}@fournisseur.mg", name.to_lowercase()),
            address: "Lot II".to_string(),
        }
    }

    #[tokio::test]
    async fn test_supplier_lifecycle() {
        let (state, session) = memory_state().await;
        let before = list_history(&state, &session).await.unwrap().len();

        let supplier = add_supplier(&state, &session, new_supplier("Alpha")).await.unwrap();
        let updated = update_supplier(
            &state,
            &session,
            &supplier.id,
            SupplierPatch {
                contact: Some("020 22 222 22".to_string()),
                ..SupplierPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Alpha");
        assert_eq!(updated.contact, "020 22 222 22");

        let product = add_product(
            &state,
            &session,
            NewProduct {
                name: "Papier".to_string(),
                reference: "PAP-A4".to_string(),
                category_id: None,
                supplier_id: Some(supplier.id.clone()),
                quantity: 3,
                unit_price_cents: 500,
            },
        )
        .await
        .unwrap();

        delete_supplier(&state, &session, &supplier.id).await.unwrap();
        let view = get_product(&state, &session, &product.product.id).await.unwrap();
        assert_eq!(view.product.supplier_id, None);
        assert_eq!(view.supplier_name, None);

        // added, updated, product added, deleted
        assert_eq!(list_history(&state, &session).await.unwrap().len(), before + 4);
    }

    #[tokio::test]
    async fn test_validation_and_unknown_id() {
        let (state, session) = memory_state().await;

        let err = add_supplier(&state, &session, new_supplier("  ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_supplier(&state, &session, "missing", SupplierPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_suppliers() {
        let (state, session) = memory_state().await;
        add_supplier(&state, &session, new_supplier("Alpha")).await.unwrap();
        add_supplier(&state, &session, new_supplier("Beta")).await.unwrap();

        let found = search_suppliers(&state, &session, "BETA@").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Beta");

        let all = search_suppliers(&state, &session, "").await.unwrap();
        assert_eq!(all, list_suppliers(&state, &session).await.unwrap());
        assert_eq!(all.len(), 2);
    }
}
