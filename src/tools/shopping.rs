//! Shopping list tools
//!
//! Thin wrappers binding the shopping subsystem to a pooled connection.

use serde::Serialize;

use crate::db::Database;
use crate::models::Recipe;
use crate::shopping::{self, AggregatedLine};
use super::recipes::RecipeSummary;
use super::{ServiceError, ServiceResult};

/// Rendered shopping list ready to be served as a download
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListFile {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

pub fn add_to_shopping_cart(
    db: &Database,
    user_id: i64,
    recipe_id: i64,
) -> ServiceResult<RecipeSummary> {
    let conn = db.get_conn()?;
    shopping::add_planned(&conn, user_id, recipe_id)?;
    let recipe = Recipe::get_by_id(&conn, recipe_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;
    Ok(recipe.into())
}

pub fn remove_from_shopping_cart(db: &Database, user_id: i64, recipe_id: i64) -> ServiceResult<()> {
    let conn = db.get_conn()?;
    shopping::remove_planned(&conn, user_id, recipe_id)?;
    Ok(())
}

/// Planned recipes, most recently added first
pub fn list_shopping_cart(db: &Database, user_id: i64) -> ServiceResult<Vec<RecipeSummary>> {
    let conn = db.get_conn()?;
    let mut recipes = Vec::new();
    for recipe_id in shopping::list_planned(&conn, user_id)? {
        if let Some(recipe) = Recipe::get_by_id(&conn, recipe_id)? {
            recipes.push(recipe.into());
        }
    }
    Ok(recipes)
}

/// Aggregated shopping list lines for a user
pub fn get_shopping_list(db: &Database, user_id: i64) -> ServiceResult<Vec<AggregatedLine>> {
    let conn = db.get_conn()?;
    Ok(shopping::build_shopping_report(&conn, user_id)?)
}

/// Aggregated shopping list rendered as `cart.txt`
pub fn render_shopping_list(db: &Database, user_id: i64) -> ServiceResult<ShoppingListFile> {
    let lines = get_shopping_list(db, user_id)?;
    let body = String::from_utf8_lossy(&shopping::render(&lines)).into_owned();
    Ok(ShoppingListFile {
        filename: shopping::REPORT_FILENAME,
        content_type: shopping::REPORT_CONTENT_TYPE,
        body,
    })
}
