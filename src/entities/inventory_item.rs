//! Inventory item entity - A quantity of one product present in one fridge.
//!
//! Quantity is never negative. An item whose quantity reached zero is inactive
//! but is kept so that its history (and alert references) stay valid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How an inventory item entered the fridge
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    /// Entered by hand
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Detected by the vision service
    #[sea_orm(string_value = "vision")]
    Vision,
    /// Scanned barcode
    #[sea_orm(string_value = "scan")]
    Scan,
}

/// Inventory item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the fridge holding the item
    pub fridge_id: i64,
    /// ID of the catalog product
    pub product_id: i64,
    /// Current quantity, always >= 0
    pub quantity: f64,
    /// Quantity when the item was added or last restocked
    pub initial_quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Best-before date, if known
    pub expiry_date: Option<Date>,
    /// When the item was opened, if it was
    pub opened_at: Option<Date>,
    /// Last time the item was seen (manual edit or detection)
    pub last_seen_at: DateTimeUtc,
    /// Where the item came from
    pub source: ItemSource,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Items with nothing left are inactive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.quantity > 0.0
    }
}

/// Defines relationships between InventoryItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one fridge
    #[sea_orm(
        belongs_to = "super::fridge::Entity",
        from = "Column::FridgeId",
        to = "super::fridge::Column::Id"
    )]
    Fridge,
    /// Each item stocks one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::fridge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fridge.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
