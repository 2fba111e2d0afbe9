//! Recipe entity - A named dish with a set of ingredient requirements.
//!
//! A recipe without a fridge scope is global and visible to every fridge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown to users
    pub title: String,
    /// Optional short description
    pub description: Option<String>,
    /// Optional preparation steps
    pub steps: Option<String>,
    /// Preparation time in minutes
    pub preparation_time: Option<i32>,
    /// Free-text difficulty (e.g. "easy")
    pub difficulty: Option<String>,
    /// Owning fridge, `None` for global recipes
    pub fridge_id: Option<i64>,
    /// When the recipe was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Recipe and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One recipe has many ingredients
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    Ingredients,
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
