//! Recipe business logic - Handles recipe definitions and their ingredients.
//!
//! A recipe is either global (`fridge_id` is `None`) or scoped to one fridge.
//! Creating a recipe inserts the recipe row and every ingredient in a single
//! database transaction.

use crate::{
    core::{
        feasibility::{IngredientRequirement, RecipeSnapshot},
        fridge::require_fridge,
        product::get_products_by_ids,
    },
    entities::{Recipe, RecipeIngredient, recipe, recipe_ingredient},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Descriptive fields of a new recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecipe {
    /// Title, must not be blank
    pub title: String,
    /// Optional short description
    pub description: Option<String>,
    /// Optional preparation steps
    pub steps: Option<String>,
    /// Preparation time in minutes
    pub preparation_time: Option<i32>,
    /// Free-text difficulty
    pub difficulty: Option<String>,
    /// Owning fridge, `None` for a global recipe
    pub fridge_id: Option<i64>,
}

/// One ingredient line of a new recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    /// Required product
    pub product_id: i64,
    /// Required quantity, must be positive
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
}

impl NewIngredient {
    /// Builds an ingredient line.
    #[must_use]
    pub fn new(product_id: i64, quantity: f64, unit: &str) -> Self {
        Self {
            product_id,
            quantity,
            unit: unit.to_string(),
        }
    }
}

fn validate_recipe(new_recipe: &NewRecipe, ingredients: &[NewIngredient]) -> Result<()> {
    if new_recipe.title.trim().is_empty() {
        return Err(Error::InvalidRecipe {
            message: "Recipe title cannot be empty".to_string(),
        });
    }
    if new_recipe.preparation_time.is_some_and(|minutes| minutes < 0) {
        return Err(Error::InvalidRecipe {
            message: "Preparation time cannot be negative".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if ingredient.quantity <= 0.0 || !ingredient.quantity.is_finite() {
            return Err(Error::InvalidRecipe {
                message: format!(
                    "Ingredient quantity must be positive, got {} for product {}",
                    ingredient.quantity, ingredient.product_id
                ),
            });
        }
        if !seen.insert(ingredient.product_id) {
            return Err(Error::InvalidRecipe {
                message: format!("Product {} is listed twice", ingredient.product_id),
            });
        }
    }
    Ok(())
}

/// Creates a recipe with its ingredients.
///
/// # Errors
/// Returns an error if:
/// - The title is blank, an ingredient quantity is not positive, or a product is listed twice
/// - The scoping fridge or an ingredient's product does not exist
/// - Any database operation fails (nothing is written in that case)
pub async fn create_recipe(
    db: &DatabaseConnection,
    new_recipe: NewRecipe,
    ingredients: Vec<NewIngredient>,
) -> Result<(recipe::Model, Vec<recipe_ingredient::Model>)> {
    validate_recipe(&new_recipe, &ingredients)?;
    if let Some(fridge_id) = new_recipe.fridge_id {
        require_fridge(db, fridge_id).await?;
    }

    let txn = db.begin().await?;

    let product_ids: Vec<i64> = ingredients.iter().map(|i| i.product_id).collect();
    let products = get_products_by_ids(&txn, &product_ids).await?;
    if let Some(unknown) = product_ids.iter().find(|id| !products.contains_key(*id)) {
        return Err(Error::ProductNotFound {
            name: unknown.to_string(),
        });
    }

    let recipe = recipe::ActiveModel {
        title: Set(new_recipe.title.trim().to_string()),
        description: Set(new_recipe.description),
        steps: Set(new_recipe.steps),
        preparation_time: Set(new_recipe.preparation_time),
        difficulty: Set(new_recipe.difficulty),
        fridge_id: Set(new_recipe.fridge_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let recipe = recipe.insert(&txn).await?;

    let mut lines = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let line = recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            product_id: Set(ingredient.product_id),
            quantity: Set(ingredient.quantity),
            unit: Set(ingredient.unit),
            ..Default::default()
        };
        lines.push(line.insert(&txn).await?);
    }

    txn.commit().await?;
    info!(recipe_id = recipe.id, title = %recipe.title, ingredients = lines.len(), "Created recipe");
    Ok((recipe, lines))
}

/// Retrieves a recipe by ID.
pub async fn get_recipe_by_id(db: &DatabaseConnection, recipe_id: i64) -> Result<Option<recipe::Model>> {
    Recipe::find_by_id(recipe_id).one(db).await.map_err(Into::into)
}

/// Retrieves the ingredient lines of a recipe.
pub async fn get_recipe_ingredients<C>(db: &C, recipe_id: i64) -> Result<Vec<recipe_ingredient::Model>>
where
    C: ConnectionTrait,
{
    RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Recipes a fridge can see: global recipes plus its own.
pub async fn get_visible_recipes<C>(db: &C, fridge_id: i64) -> Result<Vec<recipe::Model>>
where
    C: ConnectionTrait,
{
    Recipe::find()
        .filter(
            Condition::any()
                .add(recipe::Column::FridgeId.is_null())
                .add(recipe::Column::FridgeId.eq(fridge_id)),
        )
        .order_by_asc(recipe::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Visible recipes with their ingredients and products.
///
/// A product that no longer exists is reported as `None` on its requirement.
pub async fn load_recipe_snapshots<C>(db: &C, fridge_id: i64) -> Result<Vec<RecipeSnapshot>>
where
    C: ConnectionTrait,
{
    let recipes = get_visible_recipes(db, fridge_id).await?;
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let lines = RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;
    let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
    let products = get_products_by_ids(db, &product_ids).await?;

    let mut by_recipe: HashMap<i64, Vec<IngredientRequirement>> = HashMap::new();
    for line in lines {
        by_recipe
            .entry(line.recipe_id)
            .or_default()
            .push(IngredientRequirement {
                product_id: line.product_id,
                product: products.get(&line.product_id).cloned(),
                quantity: line.quantity,
                unit: line.unit,
            });
    }

    Ok(recipes
        .into_iter()
        .map(|recipe| RecipeSnapshot {
            ingredients: by_recipe.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn titled(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_recipe_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_recipe(&db, titled("  "), vec![]).await;
        assert!(matches!(result, Err(Error::InvalidRecipe { message: _ })));

        let result = create_recipe(&db, titled("Crêpes"), vec![NewIngredient::new(1, 0.0, "g")]).await;
        assert!(matches!(result, Err(Error::InvalidRecipe { message: _ })));

        let result = create_recipe(
            &db,
            titled("Crêpes"),
            vec![NewIngredient::new(1, 100.0, "g"), NewIngredient::new(1, 50.0, "g")],
        )
        .await;
        match result {
            Err(Error::InvalidRecipe { message }) => assert!(message.contains("twice")),
            other => panic!("expected InvalidRecipe, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_recipe_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let milk = create_test_product(&db, "Lait").await?;
        let eggs = create_test_product(&db, "Oeufs").await?;

        let (recipe, lines) = create_recipe(
            &db,
            NewRecipe {
                title: " Crêpes ".to_string(),
                preparation_time: Some(20),
                difficulty: Some("easy".to_string()),
                ..Default::default()
            },
            vec![NewIngredient::new(milk.id, 0.5, "L"), NewIngredient::new(eggs.id, 3.0, "unit")],
        )
        .await?;

        assert_eq!(recipe.title, "Crêpes");
        assert_eq!(recipe.fridge_id, None);
        assert_eq!(lines.len(), 2);
        assert_eq!(get_recipe_ingredients(&db, recipe.id).await?.len(), 2);
        assert!(get_recipe_by_id(&db, recipe.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let milk = create_test_product(&db, "Lait").await?;

        let result = create_recipe(
            &db,
            titled("Crêpes"),
            vec![NewIngredient::new(milk.id, 0.5, "L"), NewIngredient::new(999, 1.0, "unit")],
        )
        .await;
        assert!(matches!(result, Err(Error::ProductNotFound { name }) if name == "999"));
        assert!(Recipe::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_visible_recipes_and_snapshots() -> Result<()> {
        let (db, fridge, user) = setup_with_fridge().await?;
        let other = crate::core::fridge::create_fridge(&db, user.id, "Garage".to_string(), None).await?;
        let milk = create_test_product(&db, "Lait").await?;

        let (global, _) =
            create_recipe(&db, titled("Global"), vec![NewIngredient::new(milk.id, 1.0, "L")]).await?;
        let (mine, _) = create_recipe(
            &db,
            NewRecipe {
                title: "Mine".to_string(),
                fridge_id: Some(fridge.id),
                ..Default::default()
            },
            vec![],
        )
        .await?;
        create_recipe(
            &db,
            NewRecipe {
                title: "Theirs".to_string(),
                fridge_id: Some(other.id),
                ..Default::default()
            },
            vec![],
        )
        .await?;

        let visible: Vec<i64> = get_visible_recipes(&db, fridge.id).await?.iter().map(|r| r.id).collect();
        assert_eq!(visible, vec![global.id, mine.id]);

        let snapshots = load_recipe_snapshots(&db, fridge.id).await?;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].ingredients.len(), 1);
        assert_eq!(snapshots[0].ingredients[0].quantity, 1.0);
        assert_eq!(
            snapshots[0].ingredients[0].product.as_ref().map(|p| p.id),
            Some(milk.id)
        );
        assert!(snapshots[1].ingredients.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_scoped_recipe_requires_existing_fridge() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_recipe(
            &db,
            NewRecipe {
                title: "Lost".to_string(),
                fridge_id: Some(42),
                ..Default::default()
            },
            vec![],
        )
        .await;
        assert!(matches!(result, Err(Error::FridgeNotFound { id: 42 })));
        Ok(())
    }
}
