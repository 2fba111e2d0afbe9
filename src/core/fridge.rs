//! Fridge operations - registration and lookup.

use crate::{
    entities::{Fridge, fridge},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Registers a fridge for `owner_id`.
///
/// # Errors
/// Returns an error if the name is blank, the owner does not exist, or the insert fails.
pub async fn create_fridge(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    location: Option<String>,
) -> Result<fridge::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Fridge name cannot be empty".to_string(),
        });
    }
    crate::core::user::require_user(db, owner_id).await?;

    let fridge = fridge::ActiveModel {
        name: Set(name.trim().to_string()),
        location: Set(location),
        owner_id: Set(owner_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    fridge.insert(db).await.map_err(Into::into)
}

/// Retrieves a fridge by ID.
pub async fn get_fridge_by_id(
    db: &DatabaseConnection,
    fridge_id: i64,
) -> Result<Option<fridge::Model>> {
    Fridge::find_by_id(fridge_id).one(db).await.map_err(Into::into)
}

/// Retrieves a fridge by ID, failing with [`Error::FridgeNotFound`] when absent.
pub async fn require_fridge(db: &DatabaseConnection, fridge_id: i64) -> Result<fridge::Model> {
    get_fridge_by_id(db, fridge_id)
        .await?
        .ok_or(Error::FridgeNotFound { id: fridge_id })
}

/// Lists the fridges owned by a user, alphabetically.
pub async fn get_fridges_for_user(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<fridge::Model>> {
    Fridge::find()
        .filter(fridge::Column::OwnerId.eq(owner_id))
        .order_by_asc(fridge::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}
