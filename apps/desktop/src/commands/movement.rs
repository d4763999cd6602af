//! # Stock Movement Commands
//!
//! Entries (receipts from a supplier) and exits (withdrawals). These are the
//! only commands that change a product's quantity as a side effect.
//!
//! ## Exit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_exit(Prod1, qty 20)                           │
//! │                                                                         │
//! │  validate qty (1..=1_000_000)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  products.get(id) ──── None ────► NOT_FOUND                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  20 > on hand (15)? ── yes ─────► INSUFFICIENT_STOCK, nothing written   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  adjust_quantity(id, -20)   guarded: quantity + delta >= 0              │
//! │       │ refused ──────────────► INSUFFICIENT_STOCK, nothing written     │
//! │       ▼                                                                 │
//! │  exits.insert(exit)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  history.append("Stock exit", product_id, "Quantity: 20")               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! The writes are separate store calls, not one transaction. The guarded
//! quantity update runs before the movement row is written, so a refused
//! update never leaves an entry or exit behind. Entries are refused when
//! they would push the product past `MAX_STOCK_QUANTITY`.

use std::time::Instant;
use tracing::{debug, info, warn};

use stockroom_core::validation::validate_stock_quantity;
use stockroom_core::{
    CoreError, HistoryAction, HistoryRecord, NewStockEntry, NewStockExit, SearchQuery, Session,
    StockEntry, StockEntryView, StockExit, StockExitView, ValidationError, MAX_STOCK_QUANTITY,
};

use super::record_history;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Records a receipt and adds its quantity to the product.
pub async fn record_entry(
    state: &AppState,
    session: &Session,
    input: NewStockEntry,
) -> ApiResult<StockEntry> {
    let start = Instant::now();
    debug!(
        product_id = %input.product_id,
        supplier_id = %input.supplier_id,
        quantity = input.quantity,
        "record_entry command"
    );

    input.validate()?;
    let repos = state.repos();
    let product = repos
        .products
        .get(&input.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &input.product_id))?;
    if repos.suppliers.get(&input.supplier_id).await?.is_none() {
        return Err(ApiError::not_found("Supplier", &input.supplier_id));
    }

    if let Err(e) = validate_stock_quantity(product.quantity.saturating_add(input.quantity)) {
        warn!(
            product_id = %product.id,
            on_hand = product.quantity,
            requested = input.quantity,
            "Entry rejected: stock ceiling"
        );
        return Err(e.into());
    }

    if !repos
        .products
        .adjust_quantity(&product.id, input.quantity)
        .await?
    {
        warn!(
            product_id = %product.id,
            requested = input.quantity,
            "Entry rejected: stock changed concurrently"
        );
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        }
        .into());
    }

    let entry = input.into_entry();
    repos.entries.insert(&entry).await?;

    record_history(
        state,
        HistoryRecord::new(HistoryAction::StockEntry, format!("Quantity: {}", entry.quantity))
            .product(&entry.product_id)
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        entry_id = %entry.id,
        product_id = %entry.product_id,
        quantity = entry.quantity,
        "Stock entry recorded"
    );
    Ok(entry)
}

/// Records a withdrawal, refusing it when it exceeds the quantity on hand.
pub async fn record_exit(
    state: &AppState,
    session: &Session,
    input: NewStockExit,
) -> ApiResult<StockExit> {
    let start = Instant::now();
    debug!(
        product_id = %input.product_id,
        quantity = input.quantity,
        "record_exit command"
    );

    input.validate()?;
    let repos = state.repos();
    let product = repos
        .products
        .get(&input.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &input.product_id))?;

    let insufficient = |available: i64| CoreError::InsufficientStock {
        product: product.name.clone(),
        available,
        requested: input.quantity,
    };

    if input.quantity > product.quantity {
        warn!(
            product_id = %product.id,
            available = product.quantity,
            requested = input.quantity,
            "Exit rejected: insufficient stock"
        );
        return Err(insufficient(product.quantity).into());
    }

    if !repos
        .products
        .adjust_quantity(&product.id, -input.quantity)
        .await?
    {
        // stock changed between the read and the write
        let available = repos
            .products
            .get(&product.id)
            .await?
            .map(|p| p.quantity)
            .unwrap_or(0);
        warn!(
            product_id = %product.id,
            available,
            requested = input.quantity,
            "Exit rejected: stock changed concurrently"
        );
        return Err(insufficient(available).into());
    }

    let exit = input.into_exit();
    repos.exits.insert(&exit).await?;

    record_history(
        state,
        HistoryRecord::new(HistoryAction::StockExit, format!("Quantity: {}", exit.quantity))
            .product(&exit.product_id)
            .by(&session.user_id),
    )
    .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        exit_id = %exit.id,
        product_id = %exit.product_id,
        quantity = exit.quantity,
        remaining = product.quantity - exit.quantity,
        "Stock exit recorded"
    );
    Ok(exit)
}

pub async fn list_entries(state: &AppState, session: &Session) -> ApiResult<Vec<StockEntryView>> {
    debug!(by = %session.user_id, "list_entries command");
    Ok(state.repos().entries.list_views().await?)
}

pub async fn list_exits(state: &AppState, session: &Session) -> ApiResult<Vec<StockExitView>> {
    debug!(by = %session.user_id, "list_exits command");
    Ok(state.repos().exits.list_views().await?)
}

/// Matches product name, supplier name and date text.
pub async fn search_entries(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<StockEntryView>> {
    debug!(query = %query, by = %session.user_id, "search_entries command");
    let entries = match SearchQuery::parse(query)? {
        Some(q) => state.repos().entries.search(&q).await?,
        None => state.repos().entries.list_views().await?,
    };
    Ok(entries)
}

/// Matches product name, destination and date text.
pub async fn search_exits(
    state: &AppState,
    session: &Session,
    query: &str,
) -> ApiResult<Vec<StockExitView>> {
    debug!(query = %query, by = %session.user_id, "search_exits command");
    let exits = match SearchQuery::parse(query)? {
        Some(q) => state.repos().exits.search(&q).await?,
        None => state.repos().exits.list_views().await?,
    };
    Ok(exits)
}
