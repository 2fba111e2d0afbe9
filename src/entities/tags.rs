//! JSON-backed attribute types shared by several entities.
//!
//! Product tags and user dietary restrictions are both plain string sets; the
//! product extras bag only recognizes a documented set of keys.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A set of free-form labels (product tags, dietary restrictions).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

impl Tags {
    /// Builds a tag set from anything string-like.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// Tags lowercased and trimmed, with blanks dropped.
    pub fn canonical(&self) -> impl Iterator<Item = String> + '_ {
        self.0
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    /// Case-insensitive, whitespace-insensitive intersection test.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let mine: Vec<String> = self.canonical().collect();
        other.canonical().any(|t| mine.contains(&t))
    }

    /// Returns true when the set holds no non-blank tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canonical().next().is_none()
    }
}

/// Extra per-product metadata stored alongside the catalog entry.
///
/// Recognized keys:
/// * `min_quantity` - low-stock threshold; an item at or below it raises a low-stock alert
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ProductExtras {
    /// Minimum quantity to keep in stock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<f64>,
}
