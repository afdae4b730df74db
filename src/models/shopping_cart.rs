//! Shopping cart model
//!
//! Per-user membership rows for recipes planned for shopping.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A planned recipe membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCartEntry {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub created_at: String,
}

impl ShoppingCartEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            recipe_id: row.get("recipe_id")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO shopping_cart (user_id, recipe_id) VALUES (?1, ?2)",
            params![user_id, recipe_id],
        )?;
        let entry = conn.query_row(
            "SELECT * FROM shopping_cart WHERE id = ?1",
            [conn.last_insert_rowid()],
            Self::from_row,
        )?;
        Ok(entry)
    }

    pub fn get(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<Option<Self>> {
        let entry = conn
            .query_row(
                "SELECT * FROM shopping_cart WHERE user_id = ?1 AND recipe_id = ?2",
                params![user_id, recipe_id],
                Self::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Returns false if there was nothing to delete
    pub fn delete(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM shopping_cart WHERE user_id = ?1 AND recipe_id = ?2",
            params![user_id, recipe_id],
        )?;
        Ok(rows > 0)
    }

    /// Planned recipe ids, most recently added first
    pub fn recipe_ids_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<i64>> {
        let mut stmt = conn
            .prepare("SELECT recipe_id FROM shopping_cart WHERE user_id = ?1 ORDER BY id DESC")?;
        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
