//! Product business logic - Handles catalog operations.
//!
//! This module provides functions for creating, retrieving and updating catalog
//! products, plus the "find or create" path shared by manual creation and vision
//! ingestion. A new product is only created when no existing one is similar enough
//! (see `core::resolver`).

use crate::{
    config::settings::{CatalogProduct, MatchingConfig},
    core::resolver::{self, Resolution},
    core::shelf_life::{MAX_SHELF_LIFE_DAYS, estimate_shelf_life_days, is_valid_shelf_life},
    entities::{Product, ProductExtras, Tags, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

/// Fields needed to create a product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Free-text category
    pub category: String,
    /// Default unit ("unit" when blank)
    pub default_unit: String,
    /// Shelf life; estimated from name and category when `None`
    pub shelf_life_days: Option<i32>,
    /// Dietary tags
    pub tags: Tags,
    /// Extra attributes
    pub extra: ProductExtras,
}

impl NewProduct {
    /// A product with only a name and category.
    #[must_use]
    pub fn named(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }
}

impl From<&CatalogProduct> for NewProduct {
    fn from(entry: &CatalogProduct) -> Self {
        Self {
            name: entry.name.clone(),
            category: entry.category.clone(),
            default_unit: entry.default_unit.clone(),
            shelf_life_days: entry.shelf_life_days,
            tags: Tags::new(entry.tags.iter().cloned()),
            extra: ProductExtras {
                min_quantity: entry.min_quantity,
            },
        }
    }
}

/// Retrieves every catalog product, ordered alphabetically by name.
pub async fn get_all_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the given products keyed by id. Unknown ids are simply absent.
pub async fn get_products_by_ids<C>(
    db: &C,
    product_ids: &[i64],
) -> Result<HashMap<i64, product::Model>>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let products = Product::find()
        .filter(product::Column::Id.is_in(product_ids.iter().copied()))
        .all(db)
        .await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Creates a new product, performing input validation.
///
/// The name is trimmed, a blank unit becomes `"unit"`, and a missing shelf life
/// is estimated from the name and category.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The minimum quantity is negative
/// - The shelf life is negative or longer than [`MAX_SHELF_LIFE_DAYS`]
/// - The database insert operation fails
pub async fn create_product<C>(db: &C, new_product: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let name = new_product.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if let Some(min_quantity) = new_product.extra.min_quantity {
        validate_min_quantity(min_quantity)?;
    }
    if let Some(days) = new_product.shelf_life_days.filter(|days| !is_valid_shelf_life(*days)) {
        return Err(Error::Config {
            message: format!("Shelf life must be between 0 and {MAX_SHELF_LIFE_DAYS} days, got {days}"),
        });
    }

    let shelf_life_days = new_product
        .shelf_life_days
        .unwrap_or_else(|| estimate_shelf_life_days(&name, &new_product.category));
    let default_unit = if new_product.default_unit.trim().is_empty() {
        "unit".to_string()
    } else {
        new_product.default_unit.trim().to_string()
    };
    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        name: Set(name),
        category: Set(new_product.category.trim().to_string()),
        default_unit: Set(default_unit),
        shelf_life_days: Set(Some(shelf_life_days)),
        tags: Set(new_product.tags),
        extra: Set(new_product.extra),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    debug!(product_id = product.id, name = %product.name, "Created product");
    Ok(product)
}

/// Renames or recategorizes a product. Identity is unchanged.
///
/// # Errors
/// Returns an error if the new name is blank, the product does not exist, or the update fails.
pub async fn update_product_details(
    db: &DatabaseConnection,
    product_id: i64,
    new_name: String,
    new_category: String,
) -> Result<product::Model> {
    if new_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.name = Set(new_name.trim().to_string());
    product.category = Set(new_category.trim().to_string());
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Sets or clears the low-stock threshold of a product.
///
/// # Errors
/// Returns an error if the threshold is negative or not finite, or the product does not exist.
pub async fn set_min_quantity(
    db: &DatabaseConnection,
    product_id: i64,
    min_quantity: Option<f64>,
) -> Result<product::Model> {
    if let Some(min_quantity) = min_quantity {
        validate_min_quantity(min_quantity)?;
    }

    let existing = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?;
    let mut extra = existing.extra.clone();
    extra.min_quantity = min_quantity;

    let mut product: product::ActiveModel = existing.into();
    product.extra = Set(extra);
    product.updated_at = Set(chrono::Utc::now());
    product.update(db).await.map_err(Into::into)
}

fn validate_min_quantity(min_quantity: f64) -> Result<()> {
    if min_quantity < 0.0 || !min_quantity.is_finite() {
        return Err(Error::InvalidQuantity {
            quantity: min_quantity,
        });
    }
    Ok(())
}

/// Outcome of [`find_or_create_product`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    /// The reused or newly created product
    pub product: product::Model,
    /// True when the product was created by this call
    pub created: bool,
    /// Fuzzy score of the best candidate (100 for exact matches, 0 when nothing cleared the floor)
    pub score: f64,
}

/// Returns the catalog product `name` refers to, creating it when nothing is close enough.
///
/// Existing products scoring at or above `config.reuse_threshold` are reused;
/// otherwise a product is created with the capitalized name, the given category and
/// `shelf_life_hint` (or an estimate).
pub async fn find_or_create_product<C>(
    db: &C,
    name: &str,
    category: &str,
    config: &MatchingConfig,
    shelf_life_hint: Option<i32>,
) -> Result<ResolvedProduct>
where
    C: ConnectionTrait,
{
    let catalog = get_all_products(db).await?;

    match resolver::decide(name, category, &catalog, config, shelf_life_hint) {
        Resolution::Reuse { product, score } => {
            debug!(product_id = product.id, score, detected = name, "Reusing catalog product");
            Ok(ResolvedProduct {
                product: product.clone(),
                created: false,
                score,
            })
        }
        Resolution::Create { draft, best_score } => {
            let product = create_product(
                db,
                NewProduct {
                    name: draft.name,
                    category: draft.category,
                    shelf_life_days: Some(draft.shelf_life_days),
                    ..Default::default()
                },
            )
            .await?;
            info!(
                product_id = product.id,
                best_score,
                detected = name,
                "Created product for unmatched name"
            );
            Ok(ResolvedProduct {
                product,
                created: true,
                score: best_score,
            })
        }
    }
}

/// Inserts configured catalog products that are not present yet.
///
/// A configured product is considered present when an existing product has the
/// same normalized name. Returns the number of products inserted.
pub async fn seed_catalog(db: &DatabaseConnection, entries: &[CatalogProduct]) -> Result<usize> {
    let existing: Vec<String> = get_all_products(db)
        .await?
        .iter()
        .map(|p| crate::core::normalize::normalize(&p.name))
        .collect();

    let mut inserted = 0;
    let mut seen = existing;
    for entry in entries {
        let key = crate::core::normalize::normalize(&entry.name);
        if seen.contains(&key) {
            debug!(name = %entry.name, "Catalog product already present");
            continue;
        }
        create_product(db, NewProduct::from(entry)).await?;
        seen.push(key);
        inserted += 1;
    }

    info!(inserted, configured = entries.len(), "Seeded product catalog");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(&db, NewProduct::named("   ", "x")).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let mut negative = NewProduct::named("Lait", "x");
        negative.extra.min_quantity = Some(-1.0);
        let result = create_product(&db, negative).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity } if quantity == -1.0
        ));

        let mut bad_shelf_life = NewProduct::named("Lait", "x");
        bad_shelf_life.shelf_life_days = Some(-3);
        let result = create_product(&db, bad_shelf_life).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let mut endless = NewProduct::named("Miel", "Épicerie");
        endless.shelf_life_days = Some(i32::MAX);
        let result = create_product(&db, endless).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, NewProduct::named("  Yaourt nature ", "Crèmerie")).await?;

        assert_eq!(product.name, "Yaourt nature");
        assert_eq!(product.default_unit, "unit");
        // Estimated from the "yaourt" keyword
        assert_eq!(product.shelf_life_days, Some(14));
        assert!(product.tags.is_empty());
        assert_eq!(product.extra.min_quantity, None);

        let found = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(found.name, product.name);
        assert_eq!(found.shelf_life_days, product.shelf_life_days);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_products_is_alphabetical() -> Result<()> {
        let db = setup_test_db().await?;
        let tomato = create_test_product(&db, "Tomate").await?;
        let butter = create_test_product(&db, "Beurre").await?;

        let ids: Vec<i64> = get_all_products(&db).await?.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![butter.id, tomato.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_details() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Lait").await?;

        let updated =
            update_product_details(&db, product.id, "Lait demi-écrémé".to_string(), "Crèmerie".to_string())
                .await?;
        assert_eq!(updated.id, product.id);
        assert_eq!(updated.name, "Lait demi-écrémé");
        assert_eq!(updated.category, "Crèmerie");

        let missing = update_product_details(&db, 999, "x".to_string(), String::new()).await;
        assert!(matches!(missing, Err(Error::ProductNotFound { name: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_min_quantity() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Beurre").await?;

        let updated = set_min_quantity(&db, product.id, Some(2.0)).await?;
        assert_eq!(updated.extra.min_quantity, Some(2.0));

        let reloaded = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(reloaded.extra.min_quantity, Some(2.0));

        let cleared = set_min_quantity(&db, product.id, None).await?;
        assert_eq!(cleared.extra.min_quantity, None);

        let invalid = set_min_quantity(&db, product.id, Some(f64::NAN)).await;
        assert!(matches!(invalid, Err(Error::InvalidQuantity { quantity: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_or_create_reuses_close_match() -> Result<()> {
        let db = setup_test_db().await?;
        let milk = create_product(&db, NewProduct::named("Lait", "Produits laitiers")).await?;

        let resolved =
            find_or_create_product(&db, "les laits", "produits laitiers", &MatchingConfig::default(), None)
                .await?;
        assert!(!resolved.created);
        assert_eq!(resolved.product.id, milk.id);
        assert_eq!(resolved.score, 100.0);
        assert_eq!(get_all_products(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_or_create_creates_unmatched_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, NewProduct::named("Lait", "Produits laitiers")).await?;

        let resolved =
            find_or_create_product(&db, "saumon FUMÉ", "Poisson", &MatchingConfig::default(), None)
                .await?;
        assert!(resolved.created);
        assert_eq!(resolved.product.name, "Saumon fumé");
        assert_eq!(resolved.product.category, "Poisson");
        assert_eq!(resolved.product.shelf_life_days, Some(2));
        assert_eq!(resolved.score, 0.0);
        assert_eq!(get_all_products(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_or_create_ignores_out_of_range_shelf_life_hint() -> Result<()> {
        let db = setup_test_db().await?;
        let config = MatchingConfig::default();

        let honey = find_or_create_product(&db, "Miel", "Épicerie", &config, Some(i32::MAX)).await?;
        assert!(honey.created);
        // Falls back to the "epicerie" category estimate.
        assert_eq!(honey.product.shelf_life_days, Some(180));

        let rice =
            find_or_create_product(&db, "Riz", "Épicerie", &config, Some(MAX_SHELF_LIFE_DAYS)).await?;
        assert_eq!(rice.product.shelf_life_days, Some(MAX_SHELF_LIFE_DAYS));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_skips_existing_names() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Lait").await?;

        let entries = vec![
            CatalogProduct {
                name: "Laits".to_string(),
                category: "Produits laitiers".to_string(),
                default_unit: "L".to_string(),
                shelf_life_days: None,
                tags: vec!["lactose".to_string()],
                min_quantity: Some(1.0),
            },
            CatalogProduct {
                name: "Beurre".to_string(),
                category: "Produits laitiers".to_string(),
                default_unit: "g".to_string(),
                shelf_life_days: Some(30),
                tags: vec!["lactose".to_string()],
                min_quantity: None,
            },
        ];

        assert_eq!(seed_catalog(&db, &entries).await?, 1);
        assert_eq!(seed_catalog(&db, &entries).await?, 0);

        let products = get_all_products(&db).await?;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Beurre");
        assert_eq!(products[0].tags, Tags::new(["lactose"]));
        Ok(())
    }
}
