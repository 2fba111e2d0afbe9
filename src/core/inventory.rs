//! Inventory business logic - Handles the items stored in a fridge.
//!
//! Every operation that changes an item's quantity runs in a database transaction
//! together with `core::alert::refresh_alerts_for_item`, so pending alerts never
//! describe a quantity that no longer exists. Quantities never go negative; an item
//! at zero stays in the table as an inactive record.

use crate::{
    config::settings::AlertConfig,
    core::{
        alert::refresh_alerts_for_item,
        feasibility::InventoryEntry,
        fridge::require_fridge,
        product::{get_product_by_id, get_products_by_ids},
        shelf_life::{estimate_shelf_life_days, expiry_after},
    },
    entities::{InventoryItem, inventory_item, inventory_item::ItemSource},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::debug;

/// Fields needed to put a product in a fridge.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    /// Target fridge
    pub fridge_id: i64,
    /// Catalog product
    pub product_id: i64,
    /// Quantity, must be finite and positive
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Best-before date; today plus the product's shelf life when `None`
    pub expiry_date: Option<NaiveDate>,
    /// How the item entered the fridge
    pub source: ItemSource,
}

impl NewItem {
    /// A manually entered item without an explicit expiry date.
    #[must_use]
    pub fn new(fridge_id: i64, product_id: i64, quantity: f64, unit: &str) -> Self {
        Self {
            fridge_id,
            product_id,
            quantity,
            unit: unit.to_string(),
            expiry_date: None,
            source: ItemSource::Manual,
        }
    }
}

fn validate_positive(quantity: f64) -> Result<()> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Adds an item to a fridge.
///
/// When no expiry date is given it defaults to `today` plus the product's shelf
/// life (estimated from its name and category when the catalog has none). A shelf
/// life that lands outside the calendar leaves the expiry unknown.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not finite or not positive
/// - The fridge or product does not exist
/// - The database insert operation fails
pub async fn add_item(
    db: &DatabaseConnection,
    new_item: NewItem,
    today: NaiveDate,
) -> Result<inventory_item::Model> {
    validate_positive(new_item.quantity)?;
    require_fridge(db, new_item.fridge_id).await?;
    insert_item(db, new_item, today).await
}

async fn insert_item<C>(db: &C, new_item: NewItem, today: NaiveDate) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    let product = get_product_by_id(db, new_item.product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: new_item.product_id.to_string(),
        })?;

    let expiry_date = new_item.expiry_date.or_else(|| {
        let days = product
            .shelf_life_days
            .unwrap_or_else(|| estimate_shelf_life_days(&product.name, &product.category));
        expiry_after(today, days)
    });
    let unit = if new_item.unit.trim().is_empty() {
        product.default_unit.clone()
    } else {
        new_item.unit.trim().to_string()
    };
    let now = chrono::Utc::now();

    let item = inventory_item::ActiveModel {
        fridge_id: Set(new_item.fridge_id),
        product_id: Set(new_item.product_id),
        quantity: Set(new_item.quantity),
        initial_quantity: Set(new_item.quantity),
        unit: Set(unit),
        expiry_date: Set(expiry_date),
        opened_at: Set(None),
        last_seen_at: Set(now),
        source: Set(new_item.source),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let item = item.insert(db).await?;
    debug!(item_id = item.id, product_id = item.product_id, quantity = item.quantity, "Added inventory item");
    Ok(item)
}

/// Retrieves an inventory item by ID.
pub async fn get_item_by_id<C>(db: &C, item_id: i64) -> Result<Option<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_item<C>(db: &C, item_id: i64) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    get_item_by_id(db, item_id)
        .await?
        .ok_or(Error::InventoryItemNotFound { id: item_id })
}

/// Retrieves the items of a fridge that still have something left.
pub async fn get_active_inventory<C>(db: &C, fridge_id: i64) -> Result<Vec<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find()
        .filter(inventory_item::Column::FridgeId.eq(fridge_id))
        .filter(inventory_item::Column::Quantity.gt(0.0))
        .order_by_asc(inventory_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active inventory joined with product names, as consumed by the feasibility engine.
///
/// An item whose product row is gone keeps an empty name; it can then only be
/// matched by id.
pub async fn get_inventory_snapshot<C>(db: &C, fridge_id: i64) -> Result<Vec<InventoryEntry>>
where
    C: ConnectionTrait,
{
    let items = get_active_inventory(db, fridge_id).await?;
    let product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    let products = get_products_by_ids(db, &product_ids).await?;

    Ok(items
        .into_iter()
        .map(|item| InventoryEntry {
            product_id: item.product_id,
            product_name: products
                .get(&item.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            quantity: item.quantity,
            unit: item.unit,
            expiry_date: item.expiry_date,
            last_seen_at: item.last_seen_at,
        })
        .collect())
}

/// Writes a new quantity and refreshes the item's alerts on the same connection.
async fn apply_quantity<C>(
    db: &C,
    item: inventory_item::Model,
    new_quantity: f64,
    restocked: bool,
    today: NaiveDate,
    alerts: &AlertConfig,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    let old_quantity = item.quantity;
    let now = chrono::Utc::now();

    let mut active: inventory_item::ActiveModel = item.into();
    active.quantity = Set(new_quantity);
    active.updated_at = Set(now);
    if restocked {
        active.initial_quantity = Set(new_quantity);
        active.last_seen_at = Set(now);
    }
    let updated = active.update(db).await?;

    refresh_alerts_for_item(
        db,
        &updated,
        old_quantity,
        new_quantity,
        today,
        alerts.expiry_warning_days,
    )
    .await?;
    Ok(updated)
}

/// Sets an item's quantity. Zero is allowed and retires the item's alerts.
///
/// # Errors
/// Returns an error if the quantity is negative or not finite, or the item does not exist.
pub async fn set_quantity(
    db: &DatabaseConnection,
    item_id: i64,
    new_quantity: f64,
    today: NaiveDate,
    alerts: &AlertConfig,
) -> Result<inventory_item::Model> {
    if new_quantity < 0.0 || !new_quantity.is_finite() {
        return Err(Error::InvalidQuantity {
            quantity: new_quantity,
        });
    }

    let txn = db.begin().await?;
    let item = require_item(&txn, item_id).await?;
    let updated = apply_quantity(&txn, item, new_quantity, false, today, alerts).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Takes `amount` out of an item. The quantity stops at zero.
///
/// # Errors
/// Returns an error if the amount is not finite or not positive, or the item does not exist.
pub async fn consume(
    db: &DatabaseConnection,
    item_id: i64,
    amount: f64,
    today: NaiveDate,
    alerts: &AlertConfig,
) -> Result<inventory_item::Model> {
    validate_positive(amount)?;

    let txn = db.begin().await?;
    let item = require_item(&txn, item_id).await?;
    let new_quantity = (item.quantity - amount).max(0.0);
    let updated = apply_quantity(&txn, item, new_quantity, false, today, alerts).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Adds `amount` to an item and marks it as just seen.
///
/// # Errors
/// Returns an error if the amount is not finite or not positive, or the item does not exist.
pub async fn restock(
    db: &DatabaseConnection,
    item_id: i64,
    amount: f64,
    today: NaiveDate,
    alerts: &AlertConfig,
) -> Result<inventory_item::Model> {
    validate_positive(amount)?;

    let txn = db.begin().await?;
    let item = require_item(&txn, item_id).await?;
    let new_quantity = item.quantity + amount;
    let updated = apply_quantity(&txn, item, new_quantity, true, today, alerts).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Records when an item was opened.
pub async fn mark_opened(
    db: &DatabaseConnection,
    item_id: i64,
    opened_on: NaiveDate,
) -> Result<inventory_item::Model> {
    let mut item: inventory_item::ActiveModel = require_item(db, item_id).await?.into();
    item.opened_at = Set(Some(opened_on));
    item.updated_at = Set(chrono::Utc::now());
    item.update(db).await.map_err(Into::into)
}

/// Adds `new_item` to an existing active item of the same product, or creates one.
///
/// When merging, the existing expiry date is kept unless it was unknown. Returns
/// the item and whether it was newly created.
///
/// # Errors
/// Returns an error if the quantity is not finite or not positive, the fridge or
/// product does not exist, or a database operation fails.
pub async fn restock_or_add(
    db: &DatabaseConnection,
    new_item: NewItem,
    today: NaiveDate,
    alerts: &AlertConfig,
) -> Result<(inventory_item::Model, bool)> {
    validate_positive(new_item.quantity)?;
    require_fridge(db, new_item.fridge_id).await?;

    let txn = db.begin().await?;
    let existing = InventoryItem::find()
        .filter(inventory_item::Column::FridgeId.eq(new_item.fridge_id))
        .filter(inventory_item::Column::ProductId.eq(new_item.product_id))
        .filter(inventory_item::Column::Quantity.gt(0.0))
        .order_by_asc(inventory_item::Column::Id)
        .one(&txn)
        .await?;

    let result = match existing {
        Some(item) => {
            let new_quantity = item.quantity + new_item.quantity;
            // Fill an unknown expiry before the alert refresh reads the row.
            let item = if item.expiry_date.is_none() && new_item.expiry_date.is_some() {
                let mut active: inventory_item::ActiveModel = item.into();
                active.expiry_date = Set(new_item.expiry_date);
                active.update(&txn).await?
            } else {
                item
            };
            let updated = apply_quantity(&txn, item, new_quantity, true, today, alerts).await?;
            debug!(item_id = updated.id, quantity = updated.quantity, "Merged into existing item");
            (updated, false)
        }
        None => (insert_item(&txn, new_item, today).await?, true),
    };

    txn.commit().await?;
    Ok(result)
}
