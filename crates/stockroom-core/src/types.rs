//! # Domain Types
//!
//! Entities, their creation inputs and their partial-update patches.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐              │
//! │  │    Product    │   │   Category    │   │   Supplier    │              │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │              │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)    │              │
//! │  │  reference    │──►│  name         │   │  name         │              │
//! │  │  category_id  │   │  description  │   │  contact      │              │
//! │  │  supplier_id  │───┼───────────────┼──►│  email        │              │
//! │  │  quantity     │   └───────────────┘   └───────────────┘              │
//! │  └───────────────┘                                                      │
//! │         ▲                                                               │
//! │         │ product_id                                                    │
//! │  ┌──────┴────────┐   ┌───────────────┐   ┌───────────────┐              │
//! │  │  StockEntry   │   │  StockExit    │   │ HistoryRecord │ append-only  │
//! │  │  +quantity    │   │  -quantity    │   │ action, text  │              │
//! │  └───────────────┘   └───────────────┘   └───────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inputs and Patches
//! Every entity `X` comes with `NewX` (everything needed to create it) and,
//! when editable, `XPatch` where `None` means "keep the current value".
//! `X::apply` merges a patch into a loaded record before it is written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::{
    validate_email, validate_movement_quantity, validate_price_cents, validate_required,
    validate_stock_quantity, ValidationResult,
};

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Treats blank strings in a patch as "not provided".
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Deserializes a field that is present, `null` included, as `Some`.
///
/// Paired with `#[serde(default)]` so an absent field stays `None`; plain
/// `Option<Option<_>>` would read `null` as absent too.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Role
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Manager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::User, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A user account as returned by every read operation.
///
/// There is deliberately no password field: the hash only lives in the
/// store layer's credential row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    /// Login key.
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "Surname Name", the way user lists display accounts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.name)
    }

    /// Merges a patch into this user. The password is handled separately.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = non_blank(&patch.name) {
            self.name = name.trim().to_string();
        }
        if let Some(surname) = non_blank(&patch.surname) {
            self.surname = surname.trim().to_string();
        }
        if let Some(email) = non_blank(&patch.email) {
            self.email = email.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Plaintext; hashed before storage.
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, 100)?;
        validate_required("surname", &self.surname, 100)?;
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::required("password"));
        }
        Ok(())
    }

    /// Builds the stored user (without password).
    pub fn into_user(self) -> User {
        User {
            id: new_id(),
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Plaintext or an existing hash; blank keeps the stored hash.
    pub password: Option<String>,
}

impl UserPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(email) = non_blank(&self.email) {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Password to store, if the patch really carries one.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = non_blank(&patch.name) {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, 100)
    }

    pub fn into_category(self) -> Category {
        Category {
            id: new_id(),
            name: self.name.trim().to_string(),
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Contact person or phone number, free text.
    pub contact: String,
    pub email: String,
    pub address: String,
}

impl Supplier {
    pub fn apply(&mut self, patch: &SupplierPatch) {
        if let Some(name) = non_blank(&patch.name) {
            self.name = name.trim().to_string();
        }
        if let Some(contact) = &patch.contact {
            self.contact = contact.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.trim().to_string();
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl NewSupplier {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, 200)
    }

    pub fn into_supplier(self) -> Supplier {
        Supplier {
            id: new_id(),
            name: self.name.trim().to_string(),
            contact: self.contact,
            email: self.email.trim().to_string(),
            address: self.address,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
///
/// Category and supplier are references by id; their names are resolved at
/// read time (see [`ProductView`]), so renames never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Business reference code.
    pub reference: String,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    /// On-hand quantity, never negative.
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub date_added: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(name) = non_blank(&patch.name) {
            self.name = name.trim().to_string();
        }
        if let Some(reference) = &patch.reference {
            self.reference = reference.trim().to_string();
        }
        if let Some(category_id) = &patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(supplier_id) = &patch.supplier_id {
            self.supplier_id = supplier_id.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = patch.unit_price_cents {
            self.unit_price_cents = price;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: i64,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, 200)?;
        validate_stock_quantity(self.quantity)?;
        validate_price_cents(self.unit_price_cents)
    }

    pub fn into_product(self) -> Product {
        Product {
            id: new_id(),
            name: self.name.trim().to_string(),
            reference: self.reference.trim().to_string(),
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            date_added: Utc::now(),
        }
    }
}

/// Partial update of a product.
///
/// `category_id` / `supplier_id` are double options: `Some(None)` clears the
/// reference, `None` keeps it. In JSON that is `"categoryId": null` versus
/// leaving the key out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub reference: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub category_id: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub supplier_id: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,
}

impl ProductPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(quantity) = self.quantity {
            validate_stock_quantity(quantity)?;
        }
        if let Some(price) = self.unit_price_cents {
            validate_price_cents(price)?;
        }
        Ok(())
    }
}

/// A product with its category and supplier names resolved.
///
/// A name is `None` when the product has no reference or the referenced
/// record no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: Product,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// A recorded stock receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub id: String,
    pub product_id: String,
    pub supplier_id: String,
    pub quantity: i64,
    /// Unit purchase price.
    pub unit_cost_cents: i64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewStockEntry {
    pub product_id: String,
    pub supplier_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost_cents: i64,
}

impl NewStockEntry {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("product", &self.product_id, 64)?;
        validate_required("supplier", &self.supplier_id, 64)?;
        validate_movement_quantity(self.quantity)?;
        validate_price_cents(self.unit_cost_cents)
    }

    pub fn into_entry(self) -> StockEntry {
        StockEntry {
            id: new_id(),
            product_id: self.product_id,
            supplier_id: self.supplier_id,
            quantity: self.quantity,
            unit_cost_cents: self.unit_cost_cents,
            date: Utc::now(),
        }
    }
}

/// A recorded stock withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockExit {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Where the goods went ("Sale", a site, a customer...).
    pub destination: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewStockExit {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default = "default_destination")]
    pub destination: String,
}

fn default_destination() -> String {
    "Sale".to_string()
}

impl NewStockExit {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("product", &self.product_id, 64)?;
        validate_movement_quantity(self.quantity)
    }

    pub fn into_exit(self) -> StockExit {
        let destination = match self.destination.trim() {
            "" => default_destination(),
            d => d.to_string(),
        };
        StockExit {
            id: new_id(),
            product_id: self.product_id,
            quantity: self.quantity,
            destination,
            date: Utc::now(),
        }
    }
}

/// An entry with product and supplier names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockEntryView {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub entry: StockEntry,
    pub product_name: Option<String>,
    pub supplier_name: Option<String>,
}

/// An exit with the product name resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockExitView {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub exit: StockExit,
    pub product_name: Option<String>,
}

// =============================================================================
// History
// =============================================================================

/// Kinds of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    ProductAdded,
    ProductUpdated,
    ProductDeleted,
    SupplierAdded,
    SupplierUpdated,
    SupplierDeleted,
    CategoryAdded,
    CategoryUpdated,
    CategoryDeleted,
    UserAdded,
    UserUpdated,
    UserDeleted,
    StockEntry,
    StockExit,
}

impl HistoryAction {
    /// Label stored in [`HistoryRecord::action`].
    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::ProductAdded => "Product added",
            HistoryAction::ProductUpdated => "Product updated",
            HistoryAction::ProductDeleted => "Product deleted",
            HistoryAction::SupplierAdded => "Supplier added",
            HistoryAction::SupplierUpdated => "Supplier updated",
            HistoryAction::SupplierDeleted => "Supplier deleted",
            HistoryAction::CategoryAdded => "Category added",
            HistoryAction::CategoryUpdated => "Category updated",
            HistoryAction::CategoryDeleted => "Category deleted",
            HistoryAction::UserAdded => "User added",
            HistoryAction::UserUpdated => "User updated",
            HistoryAction::UserDeleted => "User deleted",
            HistoryAction::StockEntry => "Stock entry",
            HistoryAction::StockExit => "Stock exit",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An audit log line. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub action: String,
    pub product_id: Option<String>,
    /// The account that performed the action.
    pub user_id: Option<String>,
    pub details: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(action: HistoryAction, details: impl Into<String>) -> Self {
        HistoryRecord {
            id: new_id(),
            action: action.label().to_string(),
            product_id: None,
            user_id: None,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
