use chrono::Utc;
use dotenvy::dotenv;
use fridge_buddy::{
    config::{database, settings},
    core::{alert, feasibility},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reads an optional integer id from the environment.
fn env_id(key: &str) -> Result<Option<i64>> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| Error::Config {
            message: format!("{key} must be an integer, got '{value}'"),
        }),
        Err(_) => Ok(None),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (defaults when absent)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!(
        relevance_floor = settings.matching.relevance_floor,
        reuse_threshold = settings.matching.reuse_threshold,
        catalog = settings.products.len(),
        "Loaded settings"
    );

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the product catalog
    fridge_buddy::core::product::seed_catalog(&db, &settings.products)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Report on one fridge when asked to
    let (Some(fridge_id), Some(user_id)) = (env_id("FRIDGE_ID")?, env_id("USER_ID")?) else {
        info!("FRIDGE_ID and USER_ID not set, nothing else to do.");
        return Ok(());
    };

    let sort = feasibility::RecipeSort::parse(
        &env::var("SORT_BY").unwrap_or_else(|_| "match".to_string()),
        &env::var("SORT_ORDER").unwrap_or_else(|_| "desc".to_string()),
    )?;
    let results = feasibility::find_feasible_recipes(&db, fridge_id, user_id, sort).await?;
    for result in &results {
        info!(
            recipe = %result.recipe.title,
            can_make = result.can_make,
            match_percentage = result.match_percentage,
            combined_percentage = result.combined_percentage,
            missing = result.missing_ingredients.len(),
            shopping_list = ?result.shopping_list_status,
            "Recipe feasibility"
        );
    }

    let today = Utc::now().date_naive();
    let raised = alert::scan_fridge_alerts(
        &db,
        fridge_id,
        today,
        settings.alerts.expiry_warning_days,
    )
    .await?;
    for alert in &raised {
        info!(alert_type = ?alert.alert_type, message = %alert.message, "New alert");
    }

    Ok(())
}
