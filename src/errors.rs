//! Unified error type for the fridge backend.
//!
//! Data-quality situations (dangling product references, empty recipes, no fuzzy
//! match) are not errors; they are absorbed by the core into skip/zero outcomes.

use thiserror::Error;

/// All failures surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid configuration or input that does not fit a more specific variant
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fridge id does not exist
    #[error("Fridge not found: {id}")]
    FridgeNotFound {
        /// Requested fridge id
        id: i64,
    },

    /// User id does not exist
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// Product lookup failed
    #[error("Product not found: {name}")]
    ProductNotFound {
        /// Product name or id that was requested
        name: String,
    },

    /// Recipe id does not exist
    #[error("Recipe not found: {id}")]
    RecipeNotFound {
        /// Requested recipe id
        id: i64,
    },

    /// Inventory item id does not exist
    #[error("Inventory item not found: {id}")]
    InventoryItemNotFound {
        /// Requested inventory item id
        id: i64,
    },

    /// Shopping list (or list item) id does not exist
    #[error("Shopping list not found: {id}")]
    ShoppingListNotFound {
        /// Requested list id
        id: i64,
    },

    /// Alert id does not exist
    #[error("Alert not found: {id}")]
    AlertNotFound {
        /// Requested alert id
        id: i64,
    },

    /// Quantity is negative, zero where not allowed, or not finite
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Offending quantity
        quantity: f64,
    },

    /// Recipe definition violates an invariant (empty title, duplicate ingredient, ...)
    #[error("Invalid recipe: {message}")]
    InvalidRecipe {
        /// What is wrong with the recipe
        message: String,
    },

    /// Unknown sort key or sort direction
    #[error("Invalid sort key: {key}")]
    InvalidSortKey {
        /// The rejected key
        key: String,
    },

    /// The external vision/LLM service failed
    #[error("Vision service error: {message}")]
    Vision {
        /// Failure reported by the vision collaborator
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
