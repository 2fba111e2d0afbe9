//! Shopping list item entity - One product to buy on a shopping list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase state of a single list item
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Still to buy
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Bought
    #[sea_orm(string_value = "purchased")]
    Purchased,
    /// Dropped from the list
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Shopping list item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_list_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning list
    pub list_id: i64,
    /// ID of the product to buy
    pub product_id: i64,
    /// Quantity to buy
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Purchase state
    pub status: ItemStatus,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between ShoppingListItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one list
    #[sea_orm(
        belongs_to = "super::shopping_list::Entity",
        from = "Column::ListId",
        to = "super::shopping_list::Column::Id"
    )]
    List,
    /// Each item references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::List.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
