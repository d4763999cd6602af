//! # Dashboard Aggregation
//!
//! Pure functions that turn the current collections into dashboard figures.
//! Nothing is cached: the desktop layer loads the collections and calls
//! these on every dashboard refresh.
//!
//! ## Figures
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard                                                              │
//! │                                                                         │
//! │  ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐            │
//! │  │ Products   │ │ Out of     │ │ Entries    │ │ Exits      │  Kpi       │
//! │  │ 42         │ │ stock 3    │ │ (30d) 17   │ │ (30d) 25   │            │
//! │  └────────────┘ └────────────┘ └────────────┘ └────────────┘            │
//! │                                                                         │
//! │  Stock by category      Low stock (< 50)      Recent movements          │
//! │  Informatique ██ 120    Cable      3          ↑ Prod1  +5               │
//! │  Bureau       █  40     Prod2     12          ↓ Prod1  -15              │
//! │  Vide            0                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::types::{Category, Product, StockEntry, StockExit};

// =============================================================================
// Output Types
// =============================================================================

/// Headline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub total_products: usize,
    /// Products at quantity zero.
    pub out_of_stock: usize,
    /// Entries dated within the trailing window.
    pub recent_entries: usize,
    /// Exits dated within the trailing window.
    pub recent_exits: usize,
}

/// Total on-hand quantity of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStock {
    pub category_id: String,
    pub category_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

/// A stock entry or exit in the merged "recent activity" feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub kind: MovementKind,
    pub id: String,
    pub product_id: String,
    /// `None` when the product has since been deleted.
    pub product_name: Option<String>,
    pub quantity: i64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// Everything the dashboard screen shows, in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub kpi: Kpi,
    pub stock_by_category: Vec<CategoryStock>,
    pub low_stock: Vec<Product>,
    pub recent_movements: Vec<Movement>,
}

// =============================================================================
// Aggregations
// =============================================================================

/// Computes the headline counters.
///
/// A movement counts as recent when its date is at or after
/// `now - window_days`. A window reaching past the representable date range
/// counts every movement.
pub fn compute_kpi(
    products: &[Product],
    entries: &[StockEntry],
    exits: &[StockExit],
    now: DateTime<Utc>,
    window_days: i64,
) -> Kpi {
    let cutoff = Duration::try_days(window_days).and_then(|w| now.checked_sub_signed(w));
    let is_recent = |date: &DateTime<Utc>| cutoff.map_or(true, |c| *date >= c);

    Kpi {
        total_products: products.len(),
        out_of_stock: products.iter().filter(|p| p.is_out_of_stock()).count(),
        recent_entries: entries.iter().filter(|e| is_recent(&e.date)).count(),
        recent_exits: exits.iter().filter(|e| is_recent(&e.date)).count(),
    }
}

/// Sums product quantities per category.
///
/// Every category appears, in the order given, with zero when it has no
/// products. Uncategorised products are not counted anywhere.
pub fn stock_by_category(categories: &[Category], products: &[Product]) -> Vec<CategoryStock> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for product in products {
        if let Some(category_id) = product.category_id.as_deref() {
            *totals.entry(category_id).or_default() += product.quantity;
        }
    }

    categories
        .iter()
        .map(|c| CategoryStock {
            category_id: c.id.clone(),
            category_name: c.name.clone(),
            quantity: totals.get(c.id.as_str()).copied().unwrap_or(0),
        })
        .collect()
}

/// Products strictly below `threshold`, lowest quantity first.
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.quantity < threshold)
        .cloned()
        .collect();
    low.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.name.cmp(&b.name)));
    low
}

/// Merges entries and exits, newest first, keeping at most `limit`.
pub fn recent_movements(
    entries: &[StockEntry],
    exits: &[StockExit],
    products: &[Product],
    limit: usize,
) -> Vec<Movement> {
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();
    let name_of = |id: &str| names.get(id).map(|n| n.to_string());

    let mut movements: Vec<Movement> = entries
        .iter()
        .map(|e| Movement {
            kind: MovementKind::Entry,
            id: e.id.clone(),
            product_id: e.product_id.clone(),
            product_name: name_of(&e.product_id),
            quantity: e.quantity,
            date: e.date,
        })
        .chain(exits.iter().map(|e| Movement {
            kind: MovementKind::Exit,
            id: e.id.clone(),
            product_id: e.product_id.clone(),
            product_name: name_of(&e.product_id),
            quantity: e.quantity,
            date: e.date,
        }))
        .collect();

    movements.sort_by(|a, b| b.date.cmp(&a.date));
    movements.truncate(limit);
    movements
}

// =============================================================================
// Unit Tests
// =============================================================================
