//! Load the ingredient catalog from a JSON fixture
//!
//! Usage: load_ingredients [path]
//!
//! The file holds an array of `{"name": ..., "measurement_unit": ...}` objects.
//! Without an argument the path comes from `FOODGRAM_INGREDIENTS_PATH`.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use foodgram::config::{self, Config};
use foodgram::db::Database;
use foodgram::models::IngredientCreate;
use foodgram::tools::catalog;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("foodgram=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::ingredients_path);
    println!("Reading ingredients from {}", path.display());

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let items: Vec<IngredientCreate> = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let config = Config::from_env()?;
    let database = Database::open(&config.database_path)?;
    let response = catalog::load_ingredients(&database, &items)?;

    println!(
        "Loaded {} ingredients ({} in catalog)",
        response.loaded, response.total_in_catalog
    );
    Ok(())
}
