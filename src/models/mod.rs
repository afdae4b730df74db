//! Data models
//!
//! Rust structs representing database entities.

mod favorite;
mod follow;
mod ingredient;
mod recipe;
mod recipe_ingredient;
mod shopping_cart;
mod tag;
mod user;

pub use favorite::Favorite;
pub use follow::Follow;
pub use ingredient::{Ingredient, IngredientCreate};
pub use recipe::{Recipe, RecipeCreate, RecipeFilter, RecipeUpdate};
pub use recipe_ingredient::{CompositionEntryCreate, RecipeIngredient, RecipeIngredientDetail};
pub use shopping_cart::ShoppingCartEntry;
pub use tag::{default_color, is_valid_color, Tag, TagCreate};
pub use user::{User, UserCreate};
