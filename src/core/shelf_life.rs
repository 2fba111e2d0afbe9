//! Shelf-life estimation for products created without an explicit value.
//!
//! The lookup is an ordered fallback chain; the first rule that matches wins:
//! 1. exact product-name key
//! 2. product-name keyword (substring)
//! 3. exact category key
//! 4. coarse category groups (dairy, meat, fish, fruit, vegetable, frozen)
//! 5. [`DEFAULT_SHELF_LIFE_DAYS`]
//!
//! All keys are written in their normalized form.

use super::normalize::normalize;
use chrono::{Days, NaiveDate};

/// Used when nothing in the tables matches.
pub const DEFAULT_SHELF_LIFE_DAYS: i32 = 7;

/// Longest shelf life a product may carry (ten years).
pub const MAX_SHELF_LIFE_DAYS: i32 = 3650;

/// Shelf life by product name, also used for keyword matching (in this order).
const PRODUCT_SHELF_LIFE: &[(&str, i32)] = &[
    ("lait", 7),
    ("yaourt", 14),
    ("fromage", 21),
    ("beurre", 30),
    ("creme", 10),
    ("oeuf", 28),
    ("jambon", 5),
    ("poulet", 2),
    ("boeuf", 3),
    ("porc", 3),
    ("viande", 3),
    ("saumon", 2),
    ("poisson", 2),
    ("salade", 5),
    ("tomate", 7),
    ("carotte", 21),
    ("courgette", 7),
    ("pomme", 30),
    ("banane", 5),
    ("fraise", 3),
    ("citron", 21),
    ("pain", 3),
    ("jus", 7),
    ("legume", 10),
    ("fruit", 7),
];

/// Shelf life by exact category label.
const CATEGORY_SHELF_LIFE: &[(&str, i32)] = &[
    ("produit laitier", 7),
    ("cremerie", 7),
    ("viande", 3),
    ("boucherie", 3),
    ("charcuterie", 5),
    ("poisson", 2),
    ("fruit", 7),
    ("legume", 10),
    ("boulangerie", 3),
    ("boisson", 30),
    ("surgele", 90),
    ("epicerie", 180),
    ("condiment", 90),
];

/// Coarse keyword groups checked against the category when no exact key matches.
const CATEGORY_GROUPS: &[(&[&str], i32)] = &[
    (&["laitier", "lait", "fromage", "yaourt", "dairy"], 7),
    (&["viande", "boucherie", "volaille", "meat"], 3),
    (&["poisson", "fruit de mer", "seafood", "fish"], 2),
    (&["surgele", "congele", "frozen"], 90),
    (&["legume", "vegetable"], 10),
    (&["fruit"], 7),
];

/// Estimates how many days a product keeps once stored.
#[must_use]
pub fn estimate_shelf_life_days(product_name: &str, category: &str) -> i32 {
    let name = normalize(product_name);
    let category = normalize(category);

    if let Some(days) = lookup_exact(PRODUCT_SHELF_LIFE, &name) {
        return days;
    }

    let by_keyword = PRODUCT_SHELF_LIFE
        .iter()
        .find(|(keyword, _)| !name.is_empty() && name.contains(keyword));
    if let Some(&(_, days)) = by_keyword {
        return days;
    }

    if let Some(days) = lookup_exact(CATEGORY_SHELF_LIFE, &category) {
        return days;
    }

    let by_group = CATEGORY_GROUPS.iter().find(|(keywords, _)| {
        !category.is_empty() && keywords.iter().any(|k| category.contains(k))
    });
    if let Some(&(_, days)) = by_group {
        return days;
    }

    DEFAULT_SHELF_LIFE_DAYS
}

/// Whether `days` is a usable shelf life (`0..=MAX_SHELF_LIFE_DAYS`).
#[must_use]
pub fn is_valid_shelf_life(days: i32) -> bool {
    (0..=MAX_SHELF_LIFE_DAYS).contains(&days)
}

/// Expiry date of something stored `today` that keeps `days` days.
///
/// `None` for a negative shelf life or a date past the calendar's range.
#[must_use]
pub fn expiry_after(today: NaiveDate, days: i32) -> Option<NaiveDate> {
    let days = u64::try_from(days).ok()?;
    today.checked_add_days(Days::new(days))
}

fn lookup_exact(table: &[(&str, i32)], key: &str) -> Option<i32> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|&(_, days)| days)
}
