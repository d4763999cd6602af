//! # Commands Module
//!
//! One async function per use case, called by the desktop front end.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports, history helper)
//! ├── auth.rs       ◄─── Login
//! ├── user.rs       ◄─── User directory CRUD + search
//! ├── product.rs    ◄─── Product CRUD + search
//! ├── supplier.rs   ◄─── Supplier CRUD + search
//! ├── category.rs   ◄─── Category CRUD + search
//! ├── movement.rs   ◄─── Stock entries and exits
//! ├── history.rs    ◄─── Audit log
//! ├── dashboard.rs  ◄─── KPIs, stock by category, low stock
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end                                                              │
//! │  ─────────                                                              │
//! │  let session = authenticate(&state, email, password).await?.session;    │
//! │  record_exit(&state, &session, NewStockExit { .. }).await               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  pub async fn record_exit(                                              │
//! │      state: &AppState,      ◄── repositories, config, passwords         │
//! │      session: &Session,     ◄── who is acting (history user_id)         │
//! │      input: NewStockExit,   ◄── plain data from the form                │
//! │  ) -> ApiResult<StockExit>                                              │
//! │         │                                                               │
//! │         │ (camelCase JSON, TypeScript bindings via ts-rs)               │
//! │         ▼                                                               │
//! │  Front end receives: StockExit or { code, message }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Search
//! Every `search_*` command trims the query; an empty query returns the
//! same rows as the matching `list_*` command.

pub mod auth;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod movement;
pub mod product;
pub mod supplier;
pub mod user;

use stockroom_core::HistoryRecord;

use crate::error::ApiResult;
use crate::state::AppState;

/// Appends one audit record.
async fn record_history(state: &AppState, record: HistoryRecord) -> ApiResult<()> {
    state.repos().history.append(&record).await?;
    Ok(())
}
