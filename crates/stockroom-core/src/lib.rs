//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! Entities, validation, search matching and dashboard aggregation for the
//! Stockroom inventory backend, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    Desktop front end                            │    │
//! │  │    Login ──► Products ──► Entries/Exits ──► Dashboard           │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 stockroom-desktop commands                      │    │
//! │  │    authenticate, add_product, record_exit, dashboard, ...       │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐ ┌─────────┐   │    │
//! │  │   │  types  │ │validation│ │ search │ │   kpi   │ │ session │   │    │
//! │  │   └─────────┘ └──────────┘ └────────┘ └─────────┘ └─────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO HASHING                             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 stockroom-db (store layer)                      │    │
//! │  │          repository traits, SQLite and in-memory stores         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, creation inputs and patches
//! - [`error`] - Domain error types
//! - [`validation`] - Field validators
//! - [`search`] - Case-insensitive substring matching
//! - [`kpi`] - Dashboard aggregation
//! - [`session`] - The authenticated user passed to every use case
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::{NewProduct, ProductPatch};
//!
//! let input = NewProduct {
//!     name: "Prod1".to_string(),
//!     reference: "REF1".to_string(),
//!     category_id: None,
//!     supplier_id: None,
//!     quantity: 10,
//!     unit_price_cents: 10_000,
//! };
//! input.validate().unwrap();
//!
//! let mut product = input.into_product();
//! product.apply(&ProductPatch { quantity: Some(0), ..Default::default() });
//! assert!(product.is_out_of_stock());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kpi;
pub mod search;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use kpi::{CategoryStock, Dashboard, Kpi, Movement, MovementKind};
pub use search::SearchQuery;
pub use session::Session;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products strictly below this quantity are listed as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 50;

/// Trailing window, in days, for the entry/exit counters.
pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 30;

/// Longest accepted trailing window (about a century).
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

/// Number of movements in the dashboard activity feed.
pub const DEFAULT_RECENT_MOVEMENTS_LIMIT: usize = 10;

/// Upper bound for a single entry or exit (catches typos like 10000 for 100).
pub const MAX_MOVEMENT_QUANTITY: i64 = 1_000_000;

/// Upper bound for a product's on-hand quantity. Keeps every stored sum far
/// from `i64` overflow.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000_000;

/// Longest accepted search box value.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
