//! Alert entity - Derived state about an inventory item.
//!
//! At most one pending alert exists per (fridge, item, type). The database does
//! not enforce this; `core::alert::raise_alert` does.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of problem an alert reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Expires within the warning window (or today)
    #[sea_orm(string_value = "expiring_soon")]
    ExpiringSoon,
    /// Past its expiry date
    #[sea_orm(string_value = "expired")]
    Expired,
    /// Not seen by the fridge camera for a while
    #[sea_orm(string_value = "lost_item")]
    LostItem,
    /// At or below the product's minimum quantity
    #[sea_orm(string_value = "low_stock")]
    LowStock,
}

impl AlertType {
    /// Alert types whose wording depends on the expiry date.
    #[must_use]
    pub const fn is_expiry_related(self) -> bool {
        matches!(self, Self::ExpiringSoon | Self::Expired)
    }
}

/// Lifecycle of an alert
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Still relevant
    #[sea_orm(string_value = "pending")]
    Pending,
    /// No longer relevant
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

/// Alert database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    /// Unique identifier for the alert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Fridge the alert belongs to
    pub fridge_id: i64,
    /// Item the alert is about
    pub inventory_item_id: i64,
    /// Kind of alert
    pub alert_type: AlertType,
    /// Human-readable message, regenerated whenever the item changes
    pub message: String,
    /// Lifecycle state
    pub status: AlertStatus,
    /// When the alert was raised
    pub created_at: DateTimeUtc,
    /// When the alert was resolved
    pub resolved_at: Option<DateTimeUtc>,
}

/// Defines relationships between Alert and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each alert references one inventory item
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::InventoryItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
