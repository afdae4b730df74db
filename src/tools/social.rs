//! Social tools
//!
//! Favourites and author subscriptions. Duplicates are rejected, matching the
//! shopping cart policy.

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{Favorite, Follow, Recipe, User};
use super::recipes::RecipeSummary;
use super::{ServiceError, ServiceResult};

/// An author the user follows, with their recipes
#[derive(Debug, Serialize)]
pub struct Subscription {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: usize,
}

fn require_recipe(conn: &rusqlite::Connection, recipe_id: i64) -> ServiceResult<Recipe> {
    Recipe::get_by_id(conn, recipe_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))
}

fn require_user(conn: &rusqlite::Connection, user_id: i64) -> ServiceResult<User> {
    User::get_by_id(conn, user_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
}

// ============================================================================
// Favourites
// ============================================================================

pub fn add_favorite(db: &Database, user_id: i64, recipe_id: i64) -> ServiceResult<RecipeSummary> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let recipe = require_recipe(&conn, recipe_id)?;

    if Favorite::exists(&conn, user_id, recipe_id)? {
        return Err(ServiceError::Conflict(format!(
            "Recipe {} is already in favourites",
            recipe_id
        )));
    }
    Favorite::insert(&conn, user_id, recipe_id)?;

    info!(user_id, recipe_id, "added favourite");
    Ok(recipe.into())
}

pub fn remove_favorite(db: &Database, user_id: i64, recipe_id: i64) -> ServiceResult<()> {
    let conn = db.get_conn()?;
    require_recipe(&conn, recipe_id)?;
    if !Favorite::delete(&conn, user_id, recipe_id)? {
        return Err(ServiceError::Conflict(format!(
            "Recipe {} is not in favourites",
            recipe_id
        )));
    }
    info!(user_id, recipe_id, "removed favourite");
    Ok(())
}

// ============================================================================
// Subscriptions
// ============================================================================

fn build_subscription(conn: &rusqlite::Connection, author: User) -> ServiceResult<Subscription> {
    let recipes: Vec<RecipeSummary> = Recipe::list_by_author(conn, author.id)?
        .into_iter()
        .map(RecipeSummary::from)
        .collect();
    Ok(Subscription {
        id: author.id,
        email: author.email,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        recipes_count: recipes.len(),
        recipes,
    })
}

pub fn subscribe(db: &Database, user_id: i64, author_id: i64) -> ServiceResult<Subscription> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let author = require_user(&conn, author_id)?;

    if user_id == author_id {
        return Err(ServiceError::Conflict("Cannot subscribe to yourself".to_string()));
    }
    if Follow::exists(&conn, user_id, author_id)? {
        return Err(ServiceError::Conflict(format!(
            "Already subscribed to {}",
            author.username
        )));
    }
    Follow::insert(&conn, user_id, author_id)?;

    info!(user_id, author_id, "subscribed");
    build_subscription(&conn, author)
}

pub fn unsubscribe(db: &Database, user_id: i64, author_id: i64) -> ServiceResult<()> {
    let conn = db.get_conn()?;
    require_user(&conn, author_id)?;
    if !Follow::delete(&conn, user_id, author_id)? {
        return Err(ServiceError::Conflict(format!(
            "Not subscribed to user {}",
            author_id
        )));
    }
    info!(user_id, author_id, "unsubscribed");
    Ok(())
}

pub fn list_subscriptions(db: &Database, user_id: i64) -> ServiceResult<Vec<Subscription>> {
    let conn = db.get_conn()?;
    Follow::authors_for_user(&conn, user_id)?
        .into_iter()
        .map(|author| build_subscription(&conn, author))
        .collect()
}
