//! Favorite model

use rusqlite::{params, Connection};

use crate::db::DbResult;

/// User-to-recipe favourite membership
pub struct Favorite;

impl Favorite {
    pub fn insert(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<()> {
        conn.execute(
            "INSERT INTO favorites (user_id, recipe_id) VALUES (?1, ?2)",
            params![user_id, recipe_id],
        )?;
        Ok(())
    }

    pub fn exists(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ?1 AND recipe_id = ?2)",
            params![user_id, recipe_id],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    pub fn delete(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
            params![user_id, recipe_id],
        )?;
        Ok(rows > 0)
    }
}
