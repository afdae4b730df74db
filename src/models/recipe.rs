//! Recipe model
//!
//! Recipes with their author, tags and composition.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::recipe_ingredient::{CompositionEntryCreate, RecipeIngredient};
use super::tag::Tag;

/// A recipe row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a recipe together with its tags and composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<i64>,
    pub ingredients: Vec<CompositionEntryCreate>,
}

/// Data for updating a recipe.
///
/// `tags` and `ingredients`, when present, replace the previous sets entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<CompositionEntryCreate>>,
}

/// Listing filters. Membership filters are evaluated for `viewer_id`.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    pub tag_slugs: Vec<String>,
    pub viewer_id: Option<i64>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            author_id: row.get("author_id")?,
            name: row.get("name")?,
            text: row.get("text")?,
            cooking_time: row.get("cooking_time")?,
            image: row.get("image")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a recipe with its tags and composition.
    ///
    /// Call inside a transaction so a bad ingredient reference leaves nothing behind.
    pub fn create(conn: &Connection, author_id: i64, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (author_id, name, text, cooking_time, image)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                author_id,
                data.name,
                data.text,
                data.cooking_time,
                data.image,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Tag::set_for_recipe(conn, id, &data.tags)?;
        RecipeIngredient::replace_for_recipe(conn, id, &data.ingredients)?;

        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let recipe = conn
            .query_row("SELECT * FROM recipes WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(recipe)
    }

    pub fn exists(conn: &Connection, id: i64) -> DbResult<bool> {
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// Build the WHERE clause shared by `list` and `count`
    fn filter_clause(filter: &RecipeFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut clauses = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(author_id) = filter.author_id {
            params_vec.push(Box::new(author_id));
            clauses.push(format!("r.author_id = ?{}", params_vec.len()));
        }

        if !filter.tag_slugs.is_empty() {
            let mut placeholders = Vec::new();
            for slug in &filter.tag_slugs {
                params_vec.push(Box::new(slug.clone()));
                placeholders.push(format!("?{}", params_vec.len()));
            }
            clauses.push(format!(
                "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
                 INNER JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({}))",
                placeholders.join(", ")
            ));
        }

        // Without a viewer the membership filters cannot match anything
        if filter.is_favorited || filter.is_in_shopping_cart {
            params_vec.push(Box::new(filter.viewer_id.unwrap_or(-1)));
            let viewer = params_vec.len();
            if filter.is_favorited {
                clauses.push(format!(
                    "r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ?{})",
                    viewer
                ));
            }
            if filter.is_in_shopping_cart {
                clauses.push(format!(
                    "r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ?{})",
                    viewer
                ));
            }
        }

        let clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        (clause, params_vec)
    }

    /// List recipes newest first
    pub fn list(
        conn: &Connection,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let (clause, mut params_vec) = Self::filter_clause(filter);
        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let sql = format!(
            "SELECT r.* FROM recipes r {} ORDER BY r.id DESC LIMIT ?{} OFFSET ?{}",
            clause,
            params_vec.len() - 1,
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub fn count(conn: &Connection, filter: &RecipeFilter) -> DbResult<i64> {
        let (clause, params_vec) = Self::filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM recipes r {}", clause);
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let count = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Recipes written by one author, newest first
    pub fn list_by_author(conn: &Connection, author_id: i64) -> DbResult<Vec<Self>> {
        let filter = RecipeFilter {
            author_id: Some(author_id),
            ..Default::default()
        };
        Self::list(conn, &filter, i64::MAX, 0)
    }

    /// Update scalar fields and replace tags/composition when given.
    ///
    /// Call inside a transaction: the composition swap must be atomic.
    pub fn update(conn: &Connection, id: i64, data: &RecipeUpdate) -> DbResult<Option<Self>> {
        if !Self::exists(conn, id)? {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            params_vec.push(Box::new(name.clone()));
            updates.push(format!("name = ?{}", params_vec.len()));
        }
        if let Some(ref text) = data.text {
            params_vec.push(Box::new(text.clone()));
            updates.push(format!("text = ?{}", params_vec.len()));
        }
        if let Some(cooking_time) = data.cooking_time {
            params_vec.push(Box::new(cooking_time));
            updates.push(format!("cooking_time = ?{}", params_vec.len()));
        }
        if let Some(ref image) = data.image {
            params_vec.push(Box::new(image.clone()));
            updates.push(format!("image = ?{}", params_vec.len()));
        }

        updates.push("updated_at = datetime('now')".to_string());
        params_vec.push(Box::new(id));

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        if let Some(ref tags) = data.tags {
            Tag::set_for_recipe(conn, id, tags)?;
        }
        if let Some(ref ingredients) = data.ingredients {
            RecipeIngredient::replace_for_recipe(conn, id, ingredients)?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a recipe; composition, tags and memberships cascade.
    /// Returns false if it did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
