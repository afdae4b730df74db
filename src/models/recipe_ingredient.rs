//! Recipe Ingredient model
//!
//! Composition entries: which catalog ingredient, and how much of it, a recipe uses.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A composition entry row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i64,
}

/// Composition entry joined with its catalog ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientDetail {
    /// Catalog ingredient id
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// One (ingredient, amount) pair of a recipe being written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEntryCreate {
    #[serde(rename = "id")]
    pub ingredient_id: i64,
    pub amount: i64,
}

impl RecipeIngredient {
    /// Entries with ingredient name and unit, in insertion order
    pub fn get_details_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<RecipeIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = ?1
            ORDER BY ri.id
            "#,
        )?;

        let details = stmt
            .query_map([recipe_id], |row| {
                Ok(RecipeIngredientDetail {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    measurement_unit: row.get("measurement_unit")?,
                    amount: row.get("amount")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }

    /// Discard every entry of the recipe and write `entries` in their place
    pub fn replace_for_recipe(
        conn: &Connection,
        recipe_id: i64,
        entries: &[CompositionEntryCreate],
    ) -> DbResult<()> {
        conn.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
        )?;

        let mut stmt = conn.prepare(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?1, ?2, ?3)",
        )?;
        for entry in entries {
            stmt.execute(params![recipe_id, entry.ingredient_id, entry.amount])?;
        }
        Ok(())
    }
}
