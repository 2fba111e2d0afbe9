//! Recipe feasibility - which recipes can be made from a fridge's inventory.
//!
//! For each visible recipe the engine checks every ingredient against the active
//! inventory, lists what is missing, and blends in the purchase progress of the
//! most recent shopping list linked to that recipe. The evaluation itself
//! ([`evaluate_recipes`]) is a pure function over snapshots; [`find_feasible_recipes`]
//! loads those snapshots from the database and delegates to it.
//!
//! Data-quality problems never fail the computation: an ingredient whose product
//! no longer exists is simply unavailable, and a recipe without ingredients is
//! skipped.

use super::matching::ProductIndex;
use crate::{
    entities::{
        Tags, product, recipe,
        shopping_list::ListStatus,
        shopping_list_item::ItemStatus,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{cmp::Ordering, collections::HashMap, fmt, str::FromStr};
use tracing::{debug, info, instrument};

/// One active inventory line as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    /// Catalog product id
    pub product_id: i64,
    /// Catalog product name, used for the normalized-name fallback
    pub product_name: String,
    /// Quantity present
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Best-before date, if known
    pub expiry_date: Option<NaiveDate>,
    /// Last time the item was seen
    pub last_seen_at: DateTime<Utc>,
}

/// One ingredient requirement with its product, if the product still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRequirement {
    /// Referenced product id
    pub product_id: i64,
    /// `None` when the reference dangles
    pub product: Option<product::Model>,
    /// Required quantity
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
}

/// A recipe together with its ingredient requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSnapshot {
    /// The recipe row
    pub recipe: recipe::Model,
    /// Its ingredients
    pub ingredients: Vec<IngredientRequirement>,
}

/// A shopping list item with the name of its product.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingItemSnapshot {
    /// Product to buy
    pub product_id: i64,
    /// Product name, `None` when the product no longer exists
    pub product_name: Option<String>,
    /// Quantity to buy
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Purchase state
    pub status: ItemStatus,
}

/// The most recent non-cancelled list linked to a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListSnapshot {
    /// List id
    pub id: i64,
    /// Linked recipe
    pub recipe_id: Option<i64>,
    /// Stored aggregate status
    pub status: ListStatus,
    /// Items on the list
    pub items: Vec<ShoppingItemSnapshot>,
}

/// Purchase progress of a linked shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingProgress {
    /// Nothing purchased yet
    Pending,
    /// Some items purchased
    InProgress,
    /// Every item purchased
    Completed,
}

/// An ingredient that the inventory cannot cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingIngredient {
    /// Referenced product id
    pub product_id: i64,
    /// Product name (placeholder when the product no longer exists)
    pub product_name: String,
    /// Required quantity
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Quantity found in the fridge (0 when none)
    pub available_quantity: f64,
}

/// Per-recipe output of the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityResult {
    /// The evaluated recipe
    pub recipe: recipe::Model,
    /// Every ingredient is covered by the inventory alone
    pub can_make: bool,
    /// Ingredients the inventory cannot cover
    pub missing_ingredients: Vec<MissingIngredient>,
    /// Share of covered ingredients, rounded to one decimal
    pub match_percentage: f64,
    /// Linked shopping list, if any
    pub shopping_list_id: Option<i64>,
    /// Purchase progress of the linked list
    pub shopping_list_status: Option<ShoppingProgress>,
    /// Inventory plus purchases cover every ingredient
    pub ingredients_complete: bool,
    /// Inventory coverage blended with purchase progress
    pub combined_percentage: f64,
    /// Missing ingredients already purchased
    pub purchased_missing_count: usize,
    /// Number of missing ingredients
    pub total_missing_count: usize,
}

/// Key used to order feasibility results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Combined percentage
    #[default]
    Match,
    /// Recipe title, case-insensitive
    Name,
    /// Recipe creation time
    Date,
    /// Preparation time; recipes without one behave as if infinitely long
    Time,
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "match" => Ok(Self::Match),
            "name" => Ok(Self::Name),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            _ => Err(Error::InvalidSortKey { key: s.to_string() }),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::InvalidSortKey { key: s.to_string() }),
        }
    }
}

/// Sort directive for [`evaluate_recipes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecipeSort {
    /// Sort key
    pub by: SortBy,
    /// Direction
    pub order: SortOrder,
}

impl RecipeSort {
    /// Builds a directive.
    #[must_use]
    pub const fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }

    /// Parses a key and a direction, e.g. `("time", "asc")`.
    pub fn parse(by: &str, order: &str) -> Result<Self> {
        Ok(Self::new(by.parse()?, order.parse()?))
    }
}

impl fmt::Display for ShoppingProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        })
    }
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Evaluates every recipe against one inventory and shopping-list snapshot.
///
/// * `inventory` - active inventory lines; non-positive quantities are ignored
/// * `restrictions` - the user's dietary restrictions; recipes using a product
///   tagged with one of them are left out
/// * `shopping_lists` - latest non-cancelled list per recipe id for this user and fridge
#[must_use]
pub fn evaluate_recipes(
    recipes: &[RecipeSnapshot],
    inventory: &[InventoryEntry],
    restrictions: &Tags,
    shopping_lists: &HashMap<i64, ShoppingListSnapshot>,
    sort: RecipeSort,
) -> Vec<FeasibilityResult> {
    let stock: ProductIndex = inventory
        .iter()
        .filter(|entry| entry.quantity > 0.0)
        .map(|entry| (entry.product_id, entry.product_name.as_str(), entry.quantity))
        .collect();

    let mut results: Vec<FeasibilityResult> = recipes
        .iter()
        .filter(|snapshot| !violates_restrictions(snapshot, restrictions))
        .filter_map(|snapshot| {
            evaluate_recipe(snapshot, &stock, shopping_lists.get(&snapshot.recipe.id))
        })
        .collect();

    sort_results(&mut results, sort);
    results
}

fn violates_restrictions(snapshot: &RecipeSnapshot, restrictions: &Tags) -> bool {
    if restrictions.is_empty() {
        return false;
    }
    let excluded = snapshot.ingredients.iter().any(|ingredient| {
        ingredient
            .product
            .as_ref()
            .is_some_and(|product| product.tags.intersects(restrictions))
    });
    if excluded {
        debug!(recipe_id = snapshot.recipe.id, "Recipe excluded by dietary restrictions");
    }
    excluded
}

/// Evaluates a single recipe. Returns `None` for a recipe without ingredients.
#[must_use]
pub fn evaluate_recipe(
    snapshot: &RecipeSnapshot,
    stock: &ProductIndex,
    shopping_list: Option<&ShoppingListSnapshot>,
) -> Option<FeasibilityResult> {
    let total = snapshot.ingredients.len();
    if total == 0 {
        debug!(recipe_id = snapshot.recipe.id, "Skipping recipe without ingredients");
        return None;
    }

    // Missing ingredients paired with the product name usable for matching.
    let mut missing: Vec<(MissingIngredient, Option<&str>)> = Vec::new();
    for ingredient in &snapshot.ingredients {
        let known_name = ingredient.product.as_ref().map(|p| p.name.as_str());
        let found = known_name.and_then(|name| stock.lookup(ingredient.product_id, Some(name)));

        if found.is_some_and(|quantity| quantity >= ingredient.quantity) {
            continue;
        }

        missing.push((
            MissingIngredient {
                product_id: ingredient.product_id,
                product_name: known_name.map_or_else(
                    || format!("Unknown product #{}", ingredient.product_id),
                    str::to_string,
                ),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
                available_quantity: found.unwrap_or(0.0),
            },
            known_name,
        ));
    }

    #[allow(clippy::cast_precision_loss)]
    let base = (total - missing.len()) as f64 / total as f64 * 100.0;
    let can_make = missing.is_empty();
    let total_missing_count = missing.len();

    let mut result = FeasibilityResult {
        recipe: snapshot.recipe.clone(),
        can_make,
        missing_ingredients: Vec::new(),
        match_percentage: round1(base),
        shopping_list_id: None,
        shopping_list_status: None,
        ingredients_complete: can_make,
        combined_percentage: round1(base),
        purchased_missing_count: 0,
        total_missing_count,
    };

    if let Some(list) = shopping_list {
        result.shopping_list_id = Some(list.id);
        result.shopping_list_status = Some(ShoppingProgress::Pending);

        if !list.items.is_empty() {
            let purchases = purchased_index(list);
            let progress = list_progress(list, &purchases);
            let purchased_missing = missing
                .iter()
                .filter(|(item, name)| purchases.contains(item.product_id, *name))
                .count();

            result.shopping_list_status = Some(progress);
            result.purchased_missing_count = purchased_missing;

            if total_missing_count == 0 {
                result.combined_percentage = round1(base);
            } else if purchased_missing == total_missing_count
                || progress == ShoppingProgress::Completed
            {
                // A completed list counts as full coverage even when its items do
                // not map back to every missing ingredient.
                result.combined_percentage = 100.0;
                result.ingredients_complete = true;
            } else {
                #[allow(clippy::cast_precision_loss)]
                let covered = purchased_missing as f64 / total_missing_count as f64;
                result.combined_percentage = round1(base + covered * (100.0 - base));
            }
        }
    }

    result.missing_ingredients = missing.into_iter().map(|(item, _)| item).collect();
    Some(result)
}

fn purchased_index(list: &ShoppingListSnapshot) -> ProductIndex {
    list.items
        .iter()
        .filter(|item| item.status == ItemStatus::Purchased)
        .map(|item| {
            (
                item.product_id,
                item.product_name.as_deref().unwrap_or_default(),
                item.quantity,
            )
        })
        .collect()
}

/// Derives progress from the items: cancelled items do not count, and an item
/// counts as purchased when its product (by id or normalized name) was purchased.
fn list_progress(list: &ShoppingListSnapshot, purchases: &ProductIndex) -> ShoppingProgress {
    let counted: Vec<&ShoppingItemSnapshot> = list
        .items
        .iter()
        .filter(|item| item.status != ItemStatus::Cancelled)
        .collect();
    let purchased = counted
        .iter()
        .filter(|item| purchases.contains(item.product_id, item.product_name.as_deref()))
        .count();

    if !counted.is_empty() && purchased == counted.len() {
        ShoppingProgress::Completed
    } else if purchased > 0 {
        ShoppingProgress::InProgress
    } else {
        ShoppingProgress::Pending
    }
}

/// Orders results in place. The sort is stable, so equal keys keep their input order.
pub fn sort_results(results: &mut [FeasibilityResult], sort: RecipeSort) {
    results.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort.by);
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &FeasibilityResult, b: &FeasibilityResult, by: SortBy) -> Ordering {
    match by {
        SortBy::Match => a.combined_percentage.total_cmp(&b.combined_percentage),
        SortBy::Name => a
            .recipe
            .title
            .to_lowercase()
            .cmp(&b.recipe.title.to_lowercase()),
        SortBy::Date => a.recipe.created_at.cmp(&b.recipe.created_at),
        // `None` sorts as +infinity.
        SortBy::Time => match (a.recipe.preparation_time, b.recipe.preparation_time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Computes feasibility for every recipe visible to `fridge_id`, for `user_id`.
///
/// Loads the active inventory, the visible recipes with their ingredients, the
/// user's dietary restrictions and the latest linked shopping lists, then runs
/// [`evaluate_recipes`] on that single snapshot.
///
/// # Errors
/// Returns an error if the fridge or user does not exist or a query fails.
#[instrument(skip(db))]
pub async fn find_feasible_recipes(
    db: &DatabaseConnection,
    fridge_id: i64,
    user_id: i64,
    sort: RecipeSort,
) -> Result<Vec<FeasibilityResult>> {
    crate::core::fridge::require_fridge(db, fridge_id).await?;
    let user = crate::core::user::require_user(db, user_id).await?;

    let inventory = crate::core::inventory::get_inventory_snapshot(db, fridge_id).await?;
    let recipes = crate::core::recipe::load_recipe_snapshots(db, fridge_id).await?;
    let shopping_lists =
        crate::core::shopping_list::latest_lists_by_recipe(db, fridge_id, user_id).await?;

    let results = evaluate_recipes(
        &recipes,
        &inventory,
        &user.dietary_restrictions,
        &shopping_lists,
        sort,
    );

    info!(
        fridge_id,
        user_id,
        recipes = recipes.len(),
        results = results.len(),
        can_make = results.iter().filter(|r| r.can_make).count(),
        "Computed recipe feasibility"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::ProductExtras;
    use chrono::TimeZone;

    fn product(id: i64, name: &str, tags: &[&str]) -> product::Model {
        product::Model {
            id,
            name: name.to_string(),
            category: String::new(),
            default_unit: "unit".to_string(),
            shelf_life_days: None,
            tags: Tags::new(tags.iter().copied()),
            extra: ProductExtras::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn recipe(id: i64, title: &str, prep: Option<i32>) -> recipe::Model {
        recipe::Model {
            id,
            title: title.to_string(),
            description: None,
            steps: None,
            preparation_time: prep,
            difficulty: None,
            fridge_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::minutes(id),
        }
    }

    fn needs(product: &product::Model, quantity: f64) -> IngredientRequirement {
        IngredientRequirement {
            product_id: product.id,
            product: Some(product.clone()),
            quantity,
            unit: "unit".to_string(),
        }
    }

    fn stock(product: &product::Model, quantity: f64) -> InventoryEntry {
        InventoryEntry {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit: "unit".to_string(),
            expiry_date: None,
            last_seen_at: Utc::now(),
        }
    }

    fn list_item(product: &product::Model, status: ItemStatus) -> ShoppingItemSnapshot {
        ShoppingItemSnapshot {
            product_id: product.id,
            product_name: Some(product.name.clone()),
            quantity: 1.0,
            unit: "unit".to_string(),
            status,
        }
    }

    fn evaluate(
        recipes: &[RecipeSnapshot],
        inventory: &[InventoryEntry],
        lists: &HashMap<i64, ShoppingListSnapshot>,
    ) -> Vec<FeasibilityResult> {
        evaluate_recipes(recipes, inventory, &Tags::default(), lists, RecipeSort::default())
    }

    #[test]
    fn test_all_ingredients_present() {
        let eggs = product(1, "Oeufs", &[]);
        let milk = product(2, "Lait", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Crêpes", Some(20)),
            ingredients: vec![needs(&eggs, 3.0), needs(&milk, 0.5)],
        }];
        let inventory = vec![stock(&eggs, 6.0), stock(&milk, 1.0)];

        let results = evaluate(&recipes, &inventory, &HashMap::new());
        assert_eq!(results.len(), 1);
        assert!(results[0].can_make);
        assert_eq!(results[0].match_percentage, 100.0);
        assert!(results[0].missing_ingredients.is_empty());
        assert_eq!(results[0].combined_percentage, 100.0);
        assert!(results[0].ingredients_complete);
    }

    #[test]
    fn test_one_of_four_missing() {
        let items: Vec<product::Model> = (1..=4)
            .map(|id| product(id, &format!("Produit {id}"), &[]))
            .collect();
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Gratin", None),
            ingredients: items.iter().map(|p| needs(p, 1.0)).collect(),
        }];
        let inventory: Vec<InventoryEntry> = items[..3].iter().map(|p| stock(p, 2.0)).collect();

        let results = evaluate(&recipes, &inventory, &HashMap::new());
        let result = &results[0];
        assert_eq!(result.match_percentage, 75.0);
        assert_eq!(result.missing_ingredients.len(), 1);
        assert_eq!(result.missing_ingredients[0].product_id, 4);
        assert_eq!(result.missing_ingredients[0].available_quantity, 0.0);
        assert!(!result.can_make);
        assert_eq!(result.total_missing_count, 1);
    }

    #[test]
    fn test_insufficient_quantity_reports_what_is_there() {
        let flour = product(1, "Farine", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Pain", None),
            ingredients: vec![needs(&flour, 500.0)],
        }];
        let results = evaluate(&recipes, &[stock(&flour, 200.0)], &HashMap::new());
        assert_eq!(results[0].missing_ingredients[0].available_quantity, 200.0);
        assert_eq!(results[0].match_percentage, 0.0);
    }

    #[test]
    fn test_name_fallback_matches_other_catalog_id() {
        let catalog_milk = product(1, "Lait", &[]);
        let detected_milk = product(2, "Le lait", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Béchamel", None),
            ingredients: vec![needs(&catalog_milk, 0.5)],
        }];
        let results = evaluate(&recipes, &[stock(&detected_milk, 1.0)], &HashMap::new());
        assert!(results[0].can_make);
    }

    #[test]
    fn test_dangling_product_is_unavailable() {
        let butter = product(1, "Beurre", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Sablés", None),
            ingredients: vec![
                needs(&butter, 1.0),
                IngredientRequirement {
                    product_id: 42,
                    product: None,
                    quantity: 2.0,
                    unit: "unit".to_string(),
                },
            ],
        }];
        // Even stock under the dangling id does not count.
        let mut orphan = stock(&butter, 5.0);
        orphan.product_id = 42;
        let results = evaluate(&recipes, &[stock(&butter, 1.0), orphan], &HashMap::new());

        assert_eq!(results[0].match_percentage, 50.0);
        let missing = &results[0].missing_ingredients[0];
        assert_eq!(missing.product_id, 42);
        assert_eq!(missing.available_quantity, 0.0);
        assert_eq!(missing.product_name, "Unknown product #42");
    }

    #[test]
    fn test_recipe_without_ingredients_is_skipped() {
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Air", None),
            ingredients: Vec::new(),
        }];
        assert!(evaluate(&recipes, &[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_inactive_inventory_is_ignored() {
        let salt = product(1, "Sel", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Eau salée", None),
            ingredients: vec![needs(&salt, 0.0)],
        }];
        let results = evaluate(&recipes, &[stock(&salt, 0.0)], &HashMap::new());
        assert!(!results[0].can_make);
    }

    #[test]
    fn test_purchased_list_completes_recipe() {
        let items: Vec<product::Model> = (1..=4)
            .map(|id| product(id, &format!("Produit {id}"), &[]))
            .collect();
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Quiche", None),
            ingredients: items.iter().map(|p| needs(p, 1.0)).collect(),
        }];
        let inventory = vec![stock(&items[0], 1.0), stock(&items[1], 1.0)];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 9,
                recipe_id: Some(1),
                status: ListStatus::Completed,
                items: vec![
                    list_item(&items[2], ItemStatus::Purchased),
                    list_item(&items[3], ItemStatus::Purchased),
                ],
            },
        )]);

        let result = &evaluate(&recipes, &inventory, &lists)[0];
        assert!(!result.can_make);
        assert_eq!(result.match_percentage, 50.0);
        assert_eq!(result.combined_percentage, 100.0);
        assert!(result.ingredients_complete);
        assert_eq!(result.shopping_list_id, Some(9));
        assert_eq!(result.shopping_list_status, Some(ShoppingProgress::Completed));
        assert_eq!(result.purchased_missing_count, 2);
        assert_eq!(result.total_missing_count, 2);
    }

    #[test]
    fn test_partial_purchase_blends_percentages() {
        let items: Vec<product::Model> = (1..=3)
            .map(|id| product(id, &format!("Produit {id}"), &[]))
            .collect();
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Soupe", None),
            ingredients: items.iter().map(|p| needs(p, 1.0)).collect(),
        }];
        let inventory = vec![stock(&items[0], 1.0)];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 3,
                recipe_id: Some(1),
                status: ListStatus::Active,
                items: vec![
                    list_item(&items[1], ItemStatus::Purchased),
                    list_item(&items[2], ItemStatus::Pending),
                ],
            },
        )]);

        let result = &evaluate(&recipes, &inventory, &lists)[0];
        // base 33.33 + 1/2 * 66.67 = 66.67
        assert_eq!(result.match_percentage, 33.3);
        assert_eq!(result.combined_percentage, 66.7);
        assert!(!result.ingredients_complete);
        assert_eq!(result.shopping_list_status, Some(ShoppingProgress::InProgress));
    }

    #[test]
    fn test_purchase_matched_by_normalized_name() {
        let tomato = product(1, "Tomate", &[]);
        let other_tomato = product(8, "Les tomates", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Salade", None),
            ingredients: vec![needs(&tomato, 2.0)],
        }];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 1,
                recipe_id: Some(1),
                status: ListStatus::Completed,
                items: vec![list_item(&other_tomato, ItemStatus::Purchased)],
            },
        )]);
        let result = &evaluate(&recipes, &[], &lists)[0];
        assert_eq!(result.purchased_missing_count, 1);
        assert_eq!(result.combined_percentage, 100.0);
    }

    #[test]
    fn test_completed_list_forces_full_coverage() {
        // The list only holds an unrelated product, yet it is complete.
        let flour = product(1, "Farine", &[]);
        let sugar = product(2, "Sucre", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Caramel", None),
            ingredients: vec![needs(&sugar, 1.0)],
        }];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 2,
                recipe_id: Some(1),
                status: ListStatus::Completed,
                items: vec![list_item(&flour, ItemStatus::Purchased)],
            },
        )]);
        let result = &evaluate(&recipes, &[], &lists)[0];
        assert_eq!(result.purchased_missing_count, 0);
        assert_eq!(result.combined_percentage, 100.0);
        assert!(result.ingredients_complete);
    }

    #[test]
    fn test_cancelled_items_do_not_count_towards_progress() {
        let a = product(1, "Pomme", &[]);
        let b = product(2, "Poire", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Compote", None),
            ingredients: vec![needs(&a, 1.0), needs(&b, 1.0)],
        }];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 4,
                recipe_id: Some(1),
                status: ListStatus::Active,
                items: vec![
                    list_item(&a, ItemStatus::Purchased),
                    list_item(&b, ItemStatus::Cancelled),
                ],
            },
        )]);
        let result = &evaluate(&recipes, &[], &lists)[0];
        assert_eq!(result.shopping_list_status, Some(ShoppingProgress::Completed));
        assert_eq!(result.combined_percentage, 100.0);
    }

    #[test]
    fn test_empty_linked_list_is_reported_without_blending() {
        let a = product(1, "Pomme", &[]);
        let recipes = vec![RecipeSnapshot {
            recipe: recipe(1, "Compote", None),
            ingredients: vec![needs(&a, 1.0)],
        }];
        let lists = HashMap::from([(
            1,
            ShoppingListSnapshot {
                id: 5,
                recipe_id: Some(1),
                status: ListStatus::Active,
                items: Vec::new(),
            },
        )]);
        let result = &evaluate(&recipes, &[], &lists)[0];
        assert_eq!(result.shopping_list_id, Some(5));
        assert_eq!(result.shopping_list_status, Some(ShoppingProgress::Pending));
        assert_eq!(result.combined_percentage, 0.0);
    }

    #[test]
    fn test_dietary_restriction_excludes_recipe() {
        let cream = product(1, "Crème", &["Lactose"]);
        let pasta = product(2, "Pâtes", &["gluten"]);
        let recipes = vec![
            RecipeSnapshot {
                recipe: recipe(1, "Carbonara", None),
                ingredients: vec![needs(&cream, 1.0), needs(&pasta, 1.0)],
            },
            RecipeSnapshot {
                recipe: recipe(2, "Pâtes nature", None),
                ingredients: vec![needs(&pasta, 1.0)],
            },
        ];
        let inventory = vec![stock(&cream, 1.0), stock(&pasta, 1.0)];

        let results = evaluate_recipes(
            &recipes,
            &inventory,
            &Tags::new([" lactose "]),
            &HashMap::new(),
            RecipeSort::default(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 2);
    }

    fn timed_results() -> Vec<RecipeSnapshot> {
        let egg = product(1, "Oeuf", &[]);
        [(1, None), (2, Some(10)), (3, Some(5))]
            .into_iter()
            .map(|(id, prep)| RecipeSnapshot {
                recipe: recipe(id, &format!("Recette {id}"), prep),
                ingredients: vec![needs(&egg, 1.0)],
            })
            .collect()
    }

    fn prep_times(results: &[FeasibilityResult]) -> Vec<Option<i32>> {
        results.iter().map(|r| r.recipe.preparation_time).collect()
    }

    #[test]
    fn test_time_sort_ascending_puts_unknown_last() {
        let results = evaluate_recipes(
            &timed_results(),
            &[],
            &Tags::default(),
            &HashMap::new(),
            RecipeSort::new(SortBy::Time, SortOrder::Asc),
        );
        assert_eq!(prep_times(&results), vec![Some(5), Some(10), None]);
    }

    #[test]
    fn test_time_sort_descending_treats_unknown_as_longest() {
        let results = evaluate_recipes(
            &timed_results(),
            &[],
            &Tags::default(),
            &HashMap::new(),
            RecipeSort::new(SortBy::Time, SortOrder::Desc),
        );
        assert_eq!(prep_times(&results), vec![None, Some(10), Some(5)]);
    }

    #[test]
    fn test_sort_by_name_date_and_match() {
        let egg = product(1, "Oeuf", &[]);
        let milk = product(2, "Lait", &[]);
        let recipes = vec![
            RecipeSnapshot {
                recipe: recipe(1, "omelette", None),
                ingredients: vec![needs(&egg, 1.0), needs(&milk, 1.0)],
            },
            RecipeSnapshot {
                recipe: recipe(2, "Crêpes", None),
                ingredients: vec![needs(&milk, 1.0)],
            },
            RecipeSnapshot {
                recipe: recipe(3, "Bouillon", None),
                ingredients: vec![needs(&egg, 1.0)],
            },
        ];
        let inventory = vec![stock(&milk, 1.0)];
        let run = |by, order| {
            evaluate_recipes(
                &recipes,
                &inventory,
                &Tags::default(),
                &HashMap::new(),
                RecipeSort::new(by, order),
            )
            .into_iter()
            .map(|r| r.recipe.id)
            .collect::<Vec<_>>()
        };

        assert_eq!(run(SortBy::Name, SortOrder::Asc), vec![3, 2, 1]);
        assert_eq!(run(SortBy::Date, SortOrder::Desc), vec![3, 2, 1]);
        assert_eq!(run(SortBy::Date, SortOrder::Asc), vec![1, 2, 3]);
        assert_eq!(run(SortBy::Match, SortOrder::Desc), vec![2, 1, 3]);
        assert_eq!(run(SortBy::Match, SortOrder::Asc), vec![3, 1, 2]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let egg = product(1, "Oeuf", &[]);
        let recipes: Vec<RecipeSnapshot> = (1..=4)
            .map(|id| RecipeSnapshot {
                recipe: recipe(id, "Même titre", Some(10)),
                ingredients: vec![needs(&egg, 1.0)],
            })
            .collect();
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let ids: Vec<i64> = evaluate_recipes(
                &recipes,
                &[],
                &Tags::default(),
                &HashMap::new(),
                RecipeSort::new(SortBy::Time, order),
            )
            .into_iter()
            .map(|r| r.recipe.id)
            .collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_parse_sort_directive() {
        assert_eq!(
            RecipeSort::parse("Time", " asc").unwrap(),
            RecipeSort::new(SortBy::Time, SortOrder::Asc)
        );
        assert!(matches!(
            RecipeSort::parse("calories", "asc"),
            Err(Error::InvalidSortKey { key }) if key == "calories"
        ));
        assert!(matches!(
            RecipeSort::parse("match", "sideways"),
            Err(Error::InvalidSortKey { key: _ })
        ));
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(100.0), 100.0);
    }

    #[tokio::test]
    async fn test_find_feasible_recipes_from_database() -> Result<()> {
        use crate::core::recipe::{NewIngredient, NewRecipe, create_recipe};
        use crate::test_utils::*;

        let (db, fridge, user) = setup_with_fridge().await?;
        crate::core::user::set_dietary_restrictions(&db, user.id, Tags::new(["LACTOSE"])).await?;

        let butter = create_tagged_product(&db, "Beurre", &["lactose"]).await?;
        let eggs = create_test_product(&db, "Oeufs").await?;
        let tomato = create_test_product(&db, "Tomate").await?;
        create_test_item(&db, fridge.id, eggs.id, 6.0).await?;
        create_test_item(&db, fridge.id, butter.id, 1.0).await?;

        let titled = |title: &str, minutes: Option<i32>| NewRecipe {
            title: title.to_string(),
            preparation_time: minutes,
            ..Default::default()
        };
        let (omelette, _) = create_recipe(
            &db,
            titled("Omelette", Some(10)),
            vec![NewIngredient::new(eggs.id, 3.0, "unit")],
        )
        .await?;
        create_recipe(
            &db,
            titled("Oeufs au beurre", Some(5)),
            vec![
                NewIngredient::new(eggs.id, 2.0, "unit"),
                NewIngredient::new(butter.id, 1.0, "unit"),
            ],
        )
        .await?;
        let (salad, _) = create_recipe(
            &db,
            titled("Salade", None),
            vec![
                NewIngredient::new(eggs.id, 2.0, "unit"),
                NewIngredient::new(tomato.id, 2.0, "unit"),
            ],
        )
        .await?;
        create_recipe(&db, titled("Vide", Some(1)), vec![]).await?;

        let results = find_feasible_recipes(&db, fridge.id, user.id, RecipeSort::default()).await?;
        let ids: Vec<i64> = results.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![omelette.id, salad.id]);
        assert!(results[0].can_make);
        assert_eq!(results[1].match_percentage, 50.0);
        assert_eq!(results[1].missing_ingredients[0].product_name, "Tomate");

        let by_time = RecipeSort::parse("time", "asc")?;
        let results = find_feasible_recipes(&db, fridge.id, user.id, by_time).await?;
        let ids: Vec<i64> = results.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![omelette.id, salad.id]);

        let missing = find_feasible_recipes(&db, 999, user.id, RecipeSort::default()).await;
        assert!(matches!(missing, Err(Error::FridgeNotFound { id: 999 })));
        let missing = find_feasible_recipes(&db, fridge.id, 999, RecipeSort::default()).await;
        assert!(matches!(missing, Err(Error::UserNotFound { id: 999 })));
        Ok(())
    }
}
