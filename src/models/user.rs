//! User model
//!
//! Accounts and their API tokens.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

/// Data for registering a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            username: row.get("username")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a user with the given API token
    pub fn create(conn: &Connection, data: &UserCreate, auth_token: &str) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO users (email, username, first_name, last_name, auth_token)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.email,
                data.username,
                data.first_name,
                data.last_name,
                auth_token,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let user = conn
            .query_row("SELECT * FROM users WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(user)
    }

    /// Resolve an API token to its user
    pub fn get_by_token(conn: &Connection, token: &str) -> DbResult<Option<Self>> {
        let user = conn
            .query_row(
                "SELECT * FROM users WHERE auth_token = ?1",
                [token],
                Self::from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn exists(conn: &Connection, id: i64) -> DbResult<bool> {
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}
