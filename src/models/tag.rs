//! Tag model

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A recipe tag such as "breakfast"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Data for creating a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub slug: String,
}

pub fn default_color() -> String {
    "#ffffff".to_string()
}

/// `#rrggbb` hex colour check
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Tag {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            slug: row.get("slug")?,
        })
    }

    pub fn create(conn: &Connection, data: &TagCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO tags (name, color, slug) VALUES (?1, ?2, ?3)",
            params![data.name, data.color, data.slug],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let tag = conn
            .query_row("SELECT * FROM tags WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(tag)
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Tags attached to a recipe
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = ?1
            ORDER BY t.id
            "#,
        )?;
        let tags = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Replace the full tag set of a recipe
    pub fn set_for_recipe(conn: &Connection, recipe_id: i64, tag_ids: &[i64]) -> DbResult<()> {
        conn.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", [recipe_id])?;

        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)",
        )?;
        for tag_id in tag_ids {
            stmt.execute(params![recipe_id, tag_id])?;
        }
        Ok(())
    }
}
