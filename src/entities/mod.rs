//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod alert;
pub mod fridge;
pub mod inventory_item;
pub mod product;
pub mod recipe;
pub mod recipe_ingredient;
pub mod shopping_list;
pub mod shopping_list_item;
pub mod tags;
pub mod user;

// Re-export specific types to avoid conflicts
pub use alert::{Column as AlertColumn, Entity as Alert, Model as AlertModel};
pub use fridge::{Column as FridgeColumn, Entity as Fridge, Model as FridgeModel};
pub use inventory_item::{
    Column as InventoryItemColumn, Entity as InventoryItem, Model as InventoryItemModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use recipe::{Column as RecipeColumn, Entity as Recipe, Model as RecipeModel};
pub use recipe_ingredient::{
    Column as RecipeIngredientColumn, Entity as RecipeIngredient, Model as RecipeIngredientModel,
};
pub use shopping_list::{
    Column as ShoppingListColumn, Entity as ShoppingList, Model as ShoppingListModel,
};
pub use shopping_list_item::{
    Column as ShoppingListItemColumn, Entity as ShoppingListItem, Model as ShoppingListItemModel,
};
pub use tags::{ProductExtras, Tags};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
