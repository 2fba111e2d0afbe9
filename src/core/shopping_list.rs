//! Shopping list business logic - Handles lists, their items and purchase progress.
//!
//! A list's stored status is an aggregate of its items: once every non-cancelled
//! item is purchased the list is `completed`, otherwise it is `active`. Cancelling
//! a list is explicit and final. Lists linked to a recipe feed the purchase
//! progress of the feasibility engine.

use crate::{
    core::{
        feasibility::{FeasibilityResult, ShoppingItemSnapshot, ShoppingListSnapshot},
        fridge::require_fridge,
        product::get_products_by_ids,
        recipe::get_recipe_by_id,
        user::require_user,
    },
    entities::{
        ShoppingList, ShoppingListItem,
        shopping_list::{self, ListStatus},
        shopping_list_item::{self, ItemStatus},
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

/// Creates an empty shopping list.
///
/// # Errors
/// Returns an error if the name is blank, the user, fridge or recipe does not
/// exist, or the insert fails.
pub async fn create_shopping_list(
    db: &DatabaseConnection,
    user_id: i64,
    fridge_id: i64,
    recipe_id: Option<i64>,
    name: String,
) -> Result<shopping_list::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Shopping list name cannot be empty".to_string(),
        });
    }
    require_user(db, user_id).await?;
    require_fridge(db, fridge_id).await?;
    if let Some(recipe_id) = recipe_id {
        get_recipe_by_id(db, recipe_id)
            .await?
            .ok_or(Error::RecipeNotFound { id: recipe_id })?;
    }

    insert_list(db, user_id, fridge_id, recipe_id, name.trim().to_string()).await
}

async fn insert_list<C>(
    db: &C,
    user_id: i64,
    fridge_id: i64,
    recipe_id: Option<i64>,
    name: String,
) -> Result<shopping_list::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let list = shopping_list::ActiveModel {
        user_id: Set(user_id),
        fridge_id: Set(fridge_id),
        recipe_id: Set(recipe_id),
        name: Set(name),
        status: Set(ListStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    list.insert(db).await.map_err(Into::into)
}

async fn insert_item<C>(
    db: &C,
    list_id: i64,
    product_id: i64,
    quantity: f64,
    unit: String,
) -> Result<shopping_list_item::Model>
where
    C: ConnectionTrait,
{
    let item = shopping_list_item::ActiveModel {
        list_id: Set(list_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit: Set(unit),
        status: Set(ItemStatus::Pending),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Retrieves a shopping list by ID.
pub async fn get_list_by_id<C>(db: &C, list_id: i64) -> Result<Option<shopping_list::Model>>
where
    C: ConnectionTrait,
{
    ShoppingList::find_by_id(list_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_list<C>(db: &C, list_id: i64) -> Result<shopping_list::Model>
where
    C: ConnectionTrait,
{
    get_list_by_id(db, list_id)
        .await?
        .ok_or(Error::ShoppingListNotFound { id: list_id })
}

/// Retrieves the items of a list in insertion order.
pub async fn get_list_items<C>(db: &C, list_id: i64) -> Result<Vec<shopping_list_item::Model>>
where
    C: ConnectionTrait,
{
    ShoppingListItem::find()
        .filter(shopping_list_item::Column::ListId.eq(list_id))
        .order_by_asc(shopping_list_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Status a list should have given its items. A cancelled list stays cancelled.
#[must_use]
pub fn aggregate_status(current: ListStatus, items: &[shopping_list_item::Model]) -> ListStatus {
    if current == ListStatus::Cancelled {
        return ListStatus::Cancelled;
    }
    let mut counted = items
        .iter()
        .filter(|item| item.status != ItemStatus::Cancelled)
        .peekable();
    if counted.peek().is_none() {
        return ListStatus::Active;
    }
    if counted.all(|item| item.status == ItemStatus::Purchased) {
        ListStatus::Completed
    } else {
        ListStatus::Active
    }
}

async fn refresh_list_status<C>(db: &C, list: shopping_list::Model) -> Result<shopping_list::Model>
where
    C: ConnectionTrait,
{
    let items = get_list_items(db, list.id).await?;
    let status = aggregate_status(list.status, &items);
    if status == list.status {
        return Ok(list);
    }

    debug!(list_id = list.id, ?status, "List status changed");
    let mut list: shopping_list::ActiveModel = list.into();
    list.status = Set(status);
    list.updated_at = Set(chrono::Utc::now());
    list.update(db).await.map_err(Into::into)
}

/// Adds an item to a list. A completed list becomes active again.
///
/// # Errors
/// Returns an error if the quantity is not finite or not positive, the list is
/// unknown or cancelled, or a database operation fails.
pub async fn add_item(
    db: &DatabaseConnection,
    list_id: i64,
    product_id: i64,
    quantity: f64,
    unit: String,
) -> Result<shopping_list_item::Model> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(Error::InvalidQuantity { quantity });
    }

    let txn = db.begin().await?;
    let list = require_list(&txn, list_id).await?;
    if list.status == ListStatus::Cancelled {
        return Err(Error::Config {
            message: format!("Shopping list {list_id} is cancelled"),
        });
    }
    let item = insert_item(&txn, list_id, product_id, quantity, unit).await?;
    refresh_list_status(&txn, list).await?;
    txn.commit().await?;
    Ok(item)
}

/// Changes an item's status and recomputes its list's status.
///
/// Returns the updated item and list.
pub async fn set_item_status(
    db: &DatabaseConnection,
    item_id: i64,
    status: ItemStatus,
) -> Result<(shopping_list_item::Model, shopping_list::Model)> {
    let txn = db.begin().await?;

    let item = ShoppingListItem::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(Error::ShoppingListNotFound { id: item_id })?;
    let list_id = item.list_id;

    let mut item: shopping_list_item::ActiveModel = item.into();
    item.status = Set(status);
    item.updated_at = Set(chrono::Utc::now());
    let item = item.update(&txn).await?;

    let list = require_list(&txn, list_id).await?;
    let list = refresh_list_status(&txn, list).await?;

    txn.commit().await?;
    Ok((item, list))
}

/// Cancels a list. Cancelled lists are ignored by the feasibility engine.
pub async fn cancel_list(db: &DatabaseConnection, list_id: i64) -> Result<shopping_list::Model> {
    let mut list: shopping_list::ActiveModel = require_list(db, list_id).await?.into();
    list.status = Set(ListStatus::Cancelled);
    list.updated_at = Set(chrono::Utc::now());
    list.update(db).await.map_err(Into::into)
}

/// Most recent non-cancelled list linking `recipe_id`, `fridge_id` and `user_id`.
pub async fn latest_list_for_recipe<C>(
    db: &C,
    recipe_id: i64,
    fridge_id: i64,
    user_id: i64,
) -> Result<Option<shopping_list::Model>>
where
    C: ConnectionTrait,
{
    ShoppingList::find()
        .filter(shopping_list::Column::RecipeId.eq(recipe_id))
        .filter(shopping_list::Column::FridgeId.eq(fridge_id))
        .filter(shopping_list::Column::UserId.eq(user_id))
        .filter(shopping_list::Column::Status.ne(ListStatus::Cancelled))
        .order_by_desc(shopping_list::Column::CreatedAt)
        .order_by_desc(shopping_list::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The most recent non-cancelled list of every recipe, with item product names.
///
/// Keyed by recipe id. Lists without a recipe are not included.
pub async fn latest_lists_by_recipe<C>(
    db: &C,
    fridge_id: i64,
    user_id: i64,
) -> Result<HashMap<i64, ShoppingListSnapshot>>
where
    C: ConnectionTrait,
{
    let lists = ShoppingList::find()
        .filter(shopping_list::Column::FridgeId.eq(fridge_id))
        .filter(shopping_list::Column::UserId.eq(user_id))
        .filter(shopping_list::Column::RecipeId.is_not_null())
        .filter(shopping_list::Column::Status.ne(ListStatus::Cancelled))
        .order_by_desc(shopping_list::Column::CreatedAt)
        .order_by_desc(shopping_list::Column::Id)
        .all(db)
        .await?;

    let mut latest: HashMap<i64, shopping_list::Model> = HashMap::new();
    for list in lists {
        if let Some(recipe_id) = list.recipe_id {
            latest.entry(recipe_id).or_insert(list);
        }
    }
    if latest.is_empty() {
        return Ok(HashMap::new());
    }

    let list_ids: Vec<i64> = latest.values().map(|l| l.id).collect();
    let items = ShoppingListItem::find()
        .filter(shopping_list_item::Column::ListId.is_in(list_ids))
        .order_by_asc(shopping_list_item::Column::Id)
        .all(db)
        .await?;
    let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    let products = get_products_by_ids(db, &product_ids).await?;

    let mut items_by_list: HashMap<i64, Vec<ShoppingItemSnapshot>> = HashMap::new();
    for item in items {
        items_by_list
            .entry(item.list_id)
            .or_default()
            .push(ShoppingItemSnapshot {
                product_id: item.product_id,
                product_name: products.get(&item.product_id).map(|p| p.name.clone()),
                quantity: item.quantity,
                unit: item.unit,
                status: item.status,
            });
    }

    Ok(latest
        .into_iter()
        .map(|(recipe_id, list)| {
            let snapshot = ShoppingListSnapshot {
                id: list.id,
                recipe_id: list.recipe_id,
                status: list.status,
                items: items_by_list.remove(&list.id).unwrap_or_default(),
            };
            (recipe_id, snapshot)
        })
        .collect())
}

/// Creates a list linked to `result.recipe` with one item per missing ingredient.
///
/// Each item asks for the shortfall (required minus available quantity).
///
/// # Errors
/// Returns an error if nothing is missing, the user or fridge does not exist, or
/// a database operation fails.
pub async fn create_list_for_missing_ingredients(
    db: &DatabaseConnection,
    user_id: i64,
    fridge_id: i64,
    result: &FeasibilityResult,
) -> Result<(shopping_list::Model, Vec<shopping_list_item::Model>)> {
    if result.missing_ingredients.is_empty() {
        return Err(Error::Config {
            message: format!("Recipe {} is not missing anything", result.recipe.id),
        });
    }
    require_user(db, user_id).await?;
    require_fridge(db, fridge_id).await?;

    let txn = db.begin().await?;
    let list = insert_list(
        &txn,
        user_id,
        fridge_id,
        Some(result.recipe.id),
        format!("Shopping for {}", result.recipe.title),
    )
    .await?;

    let mut items = Vec::with_capacity(result.missing_ingredients.len());
    for missing in &result.missing_ingredients {
        let shortfall = (missing.quantity - missing.available_quantity).max(0.0);
        if shortfall <= 0.0 {
            continue;
        }
        items.push(
            insert_item(&txn, list.id, missing.product_id, shortfall, missing.unit.clone())
                .await?,
        );
    }

    txn.commit().await?;
    info!(list_id = list.id, recipe_id = result.recipe.id, items = items.len(), "Created shopping list for recipe");
    Ok((list, items))
}
