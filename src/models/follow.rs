//! Follow model
//!
//! Subscriptions from a user to a recipe author.

use rusqlite::{params, Connection};

use crate::db::DbResult;
use super::User;

pub struct Follow;

impl Follow {
    pub fn insert(conn: &Connection, user_id: i64, author_id: i64) -> DbResult<()> {
        conn.execute(
            "INSERT INTO follows (user_id, author_id) VALUES (?1, ?2)",
            params![user_id, author_id],
        )?;
        Ok(())
    }

    pub fn exists(conn: &Connection, user_id: i64, author_id: i64) -> DbResult<bool> {
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2)",
            params![user_id, author_id],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    pub fn delete(conn: &Connection, user_id: i64, author_id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2",
            params![user_id, author_id],
        )?;
        Ok(rows > 0)
    }

    /// Authors followed by a user, ordered by author id
    pub fn authors_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT author_id FROM follows WHERE user_id = ?1 ORDER BY author_id",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut authors = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(author) = User::get_by_id(conn, id)? {
                authors.push(author);
            }
        }
        Ok(authors)
    }
}
