/// Alert derivation and the alert refresh run after quantity changes
pub mod alert;
/// Recipe feasibility engine and its database loader
pub mod feasibility;
/// Fridge registration and lookup
pub mod fridge;
/// Vision ingestion of detected products
pub mod ingestion;
/// Inventory items and quantity changes
pub mod inventory;
/// Id-then-name quantity lookup
pub mod matching;
/// Product name normalization
pub mod normalize;
/// Catalog products
pub mod product;
/// Catalog resolution of detected names
pub mod resolver;
/// Recipes and their ingredients
pub mod recipe;
/// Fuzzy name scoring
pub mod scoring;
/// Shelf-life estimation
pub mod shelf_life;
/// Shopping lists and purchase progress
pub mod shopping_list;
/// Users and dietary restrictions
pub mod user;
