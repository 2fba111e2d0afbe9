//! Fridge entity - A physical refrigerator holding inventory items.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fridge database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fridges")]
pub struct Model {
    /// Unique identifier for the fridge
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "Kitchen", "Garage")
    pub name: String,
    /// Optional free-text location
    pub location: Option<String>,
    /// ID of the owning user
    pub owner_id: i64,
    /// When the fridge was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Fridge and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each fridge belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One fridge holds many inventory items
    #[sea_orm(has_many = "super::inventory_item::Entity")]
    InventoryItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
