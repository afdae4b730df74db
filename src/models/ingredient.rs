//! Ingredient model
//!
//! The ingredient catalog. An ingredient's identity for shopping purposes is its
//! `(name, measurement_unit)` pair.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A catalog ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Data for adding an ingredient to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            measurement_unit: row.get("measurement_unit")?,
        })
    }

    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO ingredients (name, measurement_unit) VALUES (?1, ?2)",
            params![data.name, data.measurement_unit],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Insert many catalog entries in one go; returns how many were written
    pub fn bulk_create(conn: &Connection, items: &[IngredientCreate]) -> DbResult<usize> {
        let mut stmt =
            conn.prepare("INSERT INTO ingredients (name, measurement_unit) VALUES (?1, ?2)")?;
        let mut written = 0;
        for item in items {
            written += stmt.execute(params![item.name, item.measurement_unit])?;
        }
        Ok(written)
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let ingredient = conn
            .query_row(
                "SELECT * FROM ingredients WHERE id = ?1",
                [id],
                Self::from_row,
            )
            .optional()?;
        Ok(ingredient)
    }

    /// List the catalog, optionally filtered by a case-insensitive name prefix
    pub fn list(conn: &Connection, name_prefix: Option<&str>) -> DbResult<Vec<Self>> {
        let ingredients = match name_prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM ingredients WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name, id",
                )?;
                let pattern = format!("{}%", escape_like(prefix));
                let rows = stmt.query_map([pattern], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY name, id")?;
                let rows = stmt.query_map([], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(ingredients)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
