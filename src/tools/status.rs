//! Foodgram Status Tool
//!
//! Runtime status of the service plus usage notes for MCP clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::Ingredient;
use super::ServiceResult;

/// Shopping list instructions for AI assistants
pub const SHOPPING_INSTRUCTIONS: &str = r#"
# Foodgram Shopping List Instructions

Every user-scoped tool takes the acting user's `user_id`. Create one with `create_user`
if needed; the returned `auth_token` is for the HTTP API only.

## Planning recipes

1. Find recipes with `list_recipes` (filters: author_id, tags, is_favorited, is_in_shopping_cart).
2. Add each recipe to the cart with `add_to_shopping_cart`.
   - Adding the same recipe twice is an error, not a no-op.
3. `list_shopping_cart` shows planned recipes, newest first.
4. `remove_from_shopping_cart` drops a recipe; removing one that is not planned is an error.

## Getting the list

- `get_shopping_list` returns structured lines: name, measurement_unit, amount.
- `render_shopping_list` returns the exact `cart.txt` text, one `name: amount, unit` line each.

Lines are merged only when both ingredient name and unit match. "milk, l" and
"milk, g" are separate lines; units are never converted.
"#;

/// Runtime status of the Foodgram service
#[derive(Debug, Clone, Serialize)]
pub struct FoodgramStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: i32,
    pub catalog_ingredients: i64,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self, db: &Database) -> ServiceResult<FoodgramStatus> {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let (schema_version, catalog_ingredients) = db.with_conn(|conn| {
            Ok((migrations::get_schema_version(conn)?, Ingredient::count(conn)?))
        })?;

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(FoodgramStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            catalog_ingredients,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}
