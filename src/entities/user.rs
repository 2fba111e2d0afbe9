//! User entity - Account that owns fridges and shopping lists.
//!
//! Only the dietary-restriction set matters to the core; identity and
//! authentication are resolved elsewhere.

use super::tags::Tags;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Dietary restrictions matched against product tags (e.g. "lactose", "gluten")
    #[sea_orm(column_type = "Json")]
    pub dietary_restrictions: Tags,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many fridges
    #[sea_orm(has_many = "super::fridge::Entity")]
    Fridges,
}

impl Related<super::fridge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fridges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
