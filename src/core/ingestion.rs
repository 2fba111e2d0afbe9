//! Vision ingestion - turns products detected in a fridge photo into inventory.
//!
//! The vision/LLM service sits behind the [`VisionClient`] trait. Each detection is
//! resolved against the catalog (reusing a close product or creating a new one) and
//! then merged into the fridge's inventory with `source = vision`.

use crate::{
    config::settings::Settings,
    core::{
        fridge::require_fridge,
        inventory::{NewItem, restock_or_add},
        product::find_or_create_product,
        shelf_life::{MAX_SHELF_LIFE_DAYS, expiry_after},
    },
    entities::inventory_item::ItemSource,
    errors::Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Date layouts accepted in printed expiry text.
const EXPIRY_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// One product as reported by the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedProduct {
    /// Name as read by the service
    pub name: String,
    /// Category guessed by the service
    #[serde(default)]
    pub category: String,
    /// How many units were seen
    #[serde(default = "default_count")]
    pub count: f64,
    /// Packaging description, if any
    #[serde(default)]
    pub packaging_text: Option<String>,
    /// Printed best-before text, if readable
    #[serde(default)]
    pub expiry_date_text: Option<String>,
    /// The service's own shelf-life estimate
    #[serde(default)]
    pub estimated_shelf_life_days: Option<i32>,
}

const fn default_count() -> f64 {
    1.0
}

impl DetectedProduct {
    /// A detection with only a name, category and count.
    #[must_use]
    pub fn new(name: &str, category: &str, count: f64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            count,
            packaging_text: None,
            expiry_date_text: None,
            estimated_shelf_life_days: None,
        }
    }
}

/// The external product-detection service.
///
/// Implementations report their own failures as `Error::Vision`.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Detects the products visible in `image`.
    async fn detect_products(&self, image: &[u8]) -> Result<Vec<DetectedProduct>>;
}

/// What happened to one detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedDetection {
    /// Name as detected
    pub detected_name: String,
    /// Catalog product the detection was attached to
    pub product_id: i64,
    /// The product was created for this detection
    pub product_created: bool,
    /// Fuzzy score of the catalog match (100 for an exact name)
    pub match_score: f64,
    /// Inventory item holding the detection
    pub item_id: i64,
    /// The inventory item was created rather than restocked
    pub item_created: bool,
    /// Item quantity after ingestion
    pub quantity: f64,
    /// Item expiry date after ingestion
    pub expiry_date: Option<NaiveDate>,
}

/// Result of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestionReport {
    /// Detections stored in the inventory
    pub ingested: Vec<IngestedDetection>,
    /// Names of detections that were ignored (blank name or non-positive count)
    pub skipped: Vec<String>,
}

impl IngestionReport {
    /// Number of catalog products created during the run.
    #[must_use]
    pub fn products_created(&self) -> usize {
        self.ingested.iter().filter(|d| d.product_created).count()
    }
}

/// Reads a date from printed expiry text such as `"DLC 12/05/2024"`.
///
/// The whole text is tried first, then each whitespace-separated token.
#[must_use]
pub fn parse_expiry_text(text: &str) -> Option<NaiveDate> {
    let parse = |candidate: &str| {
        EXPIRY_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
    };

    let text = text.trim();
    parse(text).or_else(|| {
        text.split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_ascii_digit()))
            .find_map(parse)
    })
}

/// Stores every detection in the fridge's inventory.
///
/// Expiry comes from the printed text when readable, else from the service's
/// shelf-life estimate, else from the product's own shelf life.
///
/// # Errors
/// Returns an error if the fridge does not exist or a database operation fails.
#[instrument(skip(db, detections, settings), fields(detections = detections.len()))]
pub async fn ingest_detections(
    db: &DatabaseConnection,
    fridge_id: i64,
    detections: &[DetectedProduct],
    today: NaiveDate,
    settings: &Settings,
) -> Result<IngestionReport> {
    require_fridge(db, fridge_id).await?;

    let mut report = IngestionReport::default();
    for detection in detections {
        if detection.name.trim().is_empty() || detection.count <= 0.0 || !detection.count.is_finite() {
            warn!(name = %detection.name, count = detection.count, "Ignoring unusable detection");
            report.skipped.push(detection.name.clone());
            continue;
        }

        let shelf_life_hint = detection
            .estimated_shelf_life_days
            .filter(|days| (1..=MAX_SHELF_LIFE_DAYS).contains(days));
        let resolved = find_or_create_product(
            db,
            &detection.name,
            &detection.category,
            &settings.matching,
            shelf_life_hint,
        )
        .await?;

        let expiry_date = detection
            .expiry_date_text
            .as_deref()
            .and_then(parse_expiry_text)
            .or_else(|| shelf_life_hint.and_then(|days| expiry_after(today, days)));

        let new_item = NewItem {
            fridge_id,
            product_id: resolved.product.id,
            quantity: detection.count,
            unit: resolved.product.default_unit.clone(),
            expiry_date,
            source: ItemSource::Vision,
        };
        let (item, item_created) = restock_or_add(db, new_item, today, &settings.alerts).await?;

        report.ingested.push(IngestedDetection {
            detected_name: detection.name.clone(),
            product_id: resolved.product.id,
            product_created: resolved.created,
            match_score: resolved.score,
            item_id: item.id,
            item_created,
            quantity: item.quantity,
            expiry_date: item.expiry_date,
        });
    }

    info!(
        fridge_id,
        ingested = report.ingested.len(),
        skipped = report.skipped.len(),
        products_created = report.products_created(),
        "Ingested detections"
    );
    Ok(report)
}

/// Asks `client` for the products in `image` and ingests them.
///
/// A vision failure is returned as is; nothing is resolved or stored in that case.
pub async fn ingest_from_vision(
    db: &DatabaseConnection,
    client: &dyn VisionClient,
    fridge_id: i64,
    image: &[u8],
    today: NaiveDate,
    settings: &Settings,
) -> Result<IngestionReport> {
    require_fridge(db, fridge_id).await?;
    let detections = client.detect_products(image).await?;
    ingest_detections(db, fridge_id, &detections, today, settings).await
}
