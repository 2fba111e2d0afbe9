//! Id-then-name lookup of per-product quantities.
//!
//! The same logical product can exist under several catalog ids (one created by
//! hand, one by the vision service). A [`ProductIndex`] answers "how much of this
//! product is there" by probing the exact id first and the normalized name second.
//! Build it once per computation; probing is O(1).

use super::normalize::normalize;
use std::collections::HashMap;

/// Summed quantities keyed by product id and by normalized product name.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    by_id: HashMap<i64, f64>,
    by_name: HashMap<String, f64>,
}

impl ProductIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of a product. Quantities for the same id (or the same
    /// normalized name) are summed. A blank name is only indexed by id.
    pub fn insert(&mut self, product_id: i64, product_name: &str, quantity: f64) {
        *self.by_id.entry(product_id).or_default() += quantity;

        let key = normalize(product_name);
        if !key.is_empty() {
            *self.by_name.entry(key).or_default() += quantity;
        }
    }

    /// Quantity for `product_id`, or for `product_name` when the id is unknown.
    ///
    /// A known id answers on its own even when a same-named entry holds more.
    #[must_use]
    pub fn lookup(&self, product_id: i64, product_name: Option<&str>) -> Option<f64> {
        self.by_id.get(&product_id).copied().or_else(|| {
            product_name
                .map(normalize)
                .filter(|key| !key.is_empty())
                .and_then(|key| self.by_name.get(&key).copied())
        })
    }

    /// True when the product is present under its id or its normalized name.
    #[must_use]
    pub fn contains(&self, product_id: i64, product_name: Option<&str>) -> bool {
        self.lookup(product_id, product_name).is_some()
    }

    /// Number of distinct product ids indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl<'a> FromIterator<(i64, &'a str, f64)> for ProductIndex {
    fn from_iter<T: IntoIterator<Item = (i64, &'a str, f64)>>(iter: T) -> Self {
        let mut index = Self::new();
        for (product_id, product_name, quantity) in iter {
            index.insert(product_id, product_name, quantity);
        }
        index
    }
}
