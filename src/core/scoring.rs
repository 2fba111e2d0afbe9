//! Fuzzy similarity between a detected (or ingredient) name and a catalog name.
//!
//! The score lives in `[0, 100]` and combines a normalized Levenshtein similarity
//! with a few additive bonuses, capped at 100:
//!
//! | signal                                      | contribution |
//! |---------------------------------------------|--------------|
//! | normalized names equal                      | 100 (final)  |
//! | normalized Levenshtein similarity           | 0 - 100      |
//! | one name's words are a subset of the other  | +20          |
//! | same category (case-insensitive)            | +10          |
//! | same first 4 characters (both >= 4 chars)   | +15          |

use super::normalize::normalize;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Score returned for identical normalized names.
pub const EXACT_MATCH_SCORE: f64 = 100.0;
/// Bonus when the word set of one name contains the other's.
pub const SUBSET_BONUS: f64 = 20.0;
/// Bonus when both category labels agree.
pub const CATEGORY_BONUS: f64 = 10.0;
/// Bonus when both names start with the same [`PREFIX_LEN`] characters.
pub const PREFIX_BONUS: f64 = 15.0;
/// Prefix length used for [`PREFIX_BONUS`].
pub const PREFIX_LEN: usize = 4;

/// Similarity of two product names in `[0, 100]`.
///
/// Names are normalized first. A name that normalizes to nothing matches nothing:
/// two such names score 0, not 100, even though their normalized forms are equal.
/// The formula is symmetric in its name arguments; swapping the names together
/// with their categories yields the same score.
#[must_use]
pub fn score(name_a: &str, name_b: &str, category_a: &str, category_b: &str) -> f64 {
    let a = normalize(name_a);
    let b = normalize(name_b);
    score_normalized(&a, &b, category_a, category_b)
}

/// Same as [`score`] for names that are already normalized.
///
/// Callers scoring one name against a whole catalog normalize the probe once.
#[must_use]
pub fn score_normalized(a: &str, b: &str, category_a: &str, category_b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return EXACT_MATCH_SCORE;
    }

    let mut total = similarity_ratio(a, b) * 100.0;

    if is_word_subset(a, b) {
        total += SUBSET_BONUS;
    }
    if same_category(category_a, category_b) {
        total += CATEGORY_BONUS;
    }
    if shares_prefix(a, b) {
        total += PREFIX_BONUS;
    }

    total.clamp(0.0, EXACT_MATCH_SCORE)
}

/// Character-level similarity in `[0, 1]`: `1 - levenshtein / max(len(a), len(b))`.
/// Two empty strings are identical.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

fn is_word_subset(a: &str, b: &str) -> bool {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    words_a.is_subset(&words_b) || words_b.is_subset(&words_a)
}

fn same_category(a: &str, b: &str) -> bool {
    let a = a.trim();
    !a.is_empty() && a.to_lowercase() == b.trim().to_lowercase()
}

fn shares_prefix(a: &str, b: &str) -> bool {
    let prefix_a: Vec<char> = a.chars().take(PREFIX_LEN).collect();
    let prefix_b: Vec<char> = b.chars().take(PREFIX_LEN).collect();
    prefix_a.len() == PREFIX_LEN && prefix_a == prefix_b
}
