//! Shared test utilities for `FridgeBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{fridge, inventory, product, user},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user without dietary restrictions.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), entities::Tags::default()).await
}

/// Creates a test fridge owned by `owner_id`.
///
/// # Defaults
/// * `location`: None
pub async fn create_test_fridge(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<entities::fridge::Model> {
    fridge::create_fridge(db, owner_id, name.to_string(), None).await
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * `category`: empty
/// * `default_unit`: "unit"
/// * `shelf_life_days`: estimated from the name
/// * `tags`: none
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, product::NewProduct::named(name, "")).await
}

/// Creates a test product carrying the given tags.
pub async fn create_tagged_product(
    db: &DatabaseConnection,
    name: &str,
    tags: &[&str],
) -> Result<entities::product::Model> {
    let mut new_product = product::NewProduct::named(name, "");
    new_product.tags = entities::Tags::new(tags.iter().copied());
    product::create_product(db, new_product).await
}

/// Puts `quantity` of a product in a fridge.
///
/// # Defaults
/// * `unit`: "unit"
/// * `expiry_date`: today plus the product's shelf life
/// * `source`: manual
pub async fn create_test_item(
    db: &DatabaseConnection,
    fridge_id: i64,
    product_id: i64,
    quantity: f64,
) -> Result<entities::inventory_item::Model> {
    let today = chrono::Utc::now().date_naive();
    inventory::add_item(
        db,
        inventory::NewItem::new(fridge_id, product_id, quantity, "unit"),
        today,
    )
    .await
}

/// Sets up a complete test environment with a user owning one fridge.
/// Returns (db, fridge, user) for common test scenarios.
pub async fn setup_with_fridge() -> Result<(
    DatabaseConnection,
    entities::fridge::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "Test User").await?;
    let fridge = create_test_fridge(&db, user.id, "Test Fridge").await?;
    Ok((db, fridge, user))
}
