//! Shopping list entity - A list owned by a user for one fridge, optionally
//! linked to the recipe it was generated for.
//!
//! The list status is derived from its items and kept in sync by
//! `core::shopping_list`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregate status of a shopping list
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    /// At least one item still to buy
    #[sea_orm(string_value = "active")]
    Active,
    /// Every non-cancelled item purchased
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned by the user
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Shopping list database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    /// Unique identifier for the list
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Fridge the list restocks
    pub fridge_id: i64,
    /// Recipe the list was generated for, if any
    pub recipe_id: Option<i64>,
    /// Display name
    pub name: String,
    /// Derived status
    pub status: ListStatus,
    /// When the list was created
    pub created_at: DateTimeUtc,
    /// When the list was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between ShoppingList and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One list has many items
    #[sea_orm(has_many = "super::shopping_list_item::Entity")]
    Items,
}

impl Related<super::shopping_list_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
