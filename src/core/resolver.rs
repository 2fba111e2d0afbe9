//! Product resolution - finds the catalog product a detected name refers to.
//!
//! The resolver only ranks candidates. Deciding whether the best candidate is good
//! enough to reuse (versus creating a new product) is the caller's policy; see
//! [`decide`] and `core::product::find_or_create_product`.

use super::normalize::normalize;
use super::scoring::score_normalized;
use super::shelf_life::{MAX_SHELF_LIFE_DAYS, estimate_shelf_life_days};
use crate::config::settings::MatchingConfig;
use crate::entities::product;

/// Candidates scoring below this are not considered at all.
pub const RELEVANCE_FLOOR: f64 = 50.0;

/// Ingestion reuses an existing product at or above this score.
pub const REUSE_THRESHOLD: f64 = 70.0;

/// Returns the best catalog product for `detected_name` and its score.
///
/// Every product is scored with [`score_normalized`] using `detected_category`
/// against the product's own category. Candidates below `relevance_floor` are
/// dropped; among the rest the highest score wins and ties go to the product seen
/// first. When nothing clears the floor the result is `(None, 0.0)`.
#[must_use]
pub fn resolve<'a, I>(
    detected_name: &str,
    detected_category: &str,
    catalog: I,
    relevance_floor: f64,
) -> (Option<&'a product::Model>, f64)
where
    I: IntoIterator<Item = &'a product::Model>,
{
    let probe = normalize(detected_name);
    let mut best: Option<(&product::Model, f64)> = None;

    for candidate in catalog {
        let candidate_score = score_normalized(
            &probe,
            &normalize(&candidate.name),
            detected_category,
            &candidate.category,
        );
        if candidate_score < relevance_floor {
            continue;
        }
        if best.is_none_or(|(_, best_score)| candidate_score > best_score) {
            best = Some((candidate, candidate_score));
        }
    }

    best.map_or((None, 0.0), |(found, found_score)| (Some(found), found_score))
}

/// What an ingestion flow should do with a detected name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// Reuse this catalog product
    Reuse {
        /// The matched product
        product: &'a product::Model,
        /// Its fuzzy score
        score: f64,
    },
    /// No product is close enough; create one from this draft
    Create {
        /// Product to insert
        draft: NewProductDraft,
        /// Best score seen (0 when nothing cleared the floor)
        best_score: f64,
    },
}

/// Fields for a product about to be created from a detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductDraft {
    /// Capitalized detected name
    pub name: String,
    /// Detected category
    pub category: String,
    /// Provided or estimated shelf life
    pub shelf_life_days: i32,
}

/// Applies the reuse policy: reuse at or above `reuse_threshold`, create otherwise.
///
/// `shelf_life_hint` (e.g. the vision service's own estimate) takes precedence over
/// the static estimate when a product has to be created, provided it lies in
/// `1..=MAX_SHELF_LIFE_DAYS`.
#[must_use]
pub fn decide<'a, I>(
    detected_name: &str,
    detected_category: &str,
    catalog: I,
    config: &MatchingConfig,
    shelf_life_hint: Option<i32>,
) -> Resolution<'a>
where
    I: IntoIterator<Item = &'a product::Model>,
{
    let (found, best_score) = resolve(
        detected_name,
        detected_category,
        catalog,
        config.relevance_floor,
    );

    match found {
        Some(product) if best_score >= config.reuse_threshold => Resolution::Reuse {
            product,
            score: best_score,
        },
        _ => Resolution::Create {
            draft: NewProductDraft {
                name: capitalize(detected_name),
                category: detected_category.trim().to_string(),
                shelf_life_days: shelf_life_hint
                    .filter(|days| (1..=MAX_SHELF_LIFE_DAYS).contains(days))
                    .unwrap_or_else(|| estimate_shelf_life_days(detected_name, detected_category)),
            },
            best_score,
        },
    }
}

/// Uppercases the first character and lowercases the rest ("LAIT entier" -> "Lait entier").
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
