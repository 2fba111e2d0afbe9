//! Product entity - Catalog entry shared by inventory items, recipe ingredients
//! and shopping list items.
//!
//! Products are created on first unmatched detection or by hand. Identity is
//! stable; name and category may be edited later.

use super::tags::{ProductExtras, Tags};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Lait entier", "Tomates cerises")
    pub name: String,
    /// Free-text classifier (e.g., "Produits laitiers")
    pub category: String,
    /// Unit used when none is given (e.g., "L", "g", "unit")
    pub default_unit: String,
    /// Typical shelf life once stored, if known
    pub shelf_life_days: Option<i32>,
    /// Labels matched against users' dietary restrictions
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    /// Extra attributes (see [`ProductExtras`] for recognized keys)
    #[sea_orm(column_type = "Json")]
    pub extra: ProductExtras,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product is stocked by many inventory items
    #[sea_orm(has_many = "super::inventory_item::Entity")]
    InventoryItems,
    /// One product is required by many recipe ingredients
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredients,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
