//! Catalog tools
//!
//! Tags and the ingredient catalog. Both are written by operators (MCP tools and
//! the ingredient loader) and read by everyone.

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{is_valid_color, Ingredient, IngredientCreate, Tag, TagCreate};
use super::{validate_non_empty, ServiceError, ServiceResult};

/// Response for load_ingredients
#[derive(Debug, Serialize)]
pub struct LoadIngredientsResponse {
    pub loaded: usize,
    pub total_in_catalog: i64,
}

// ============================================================================
// Tags
// ============================================================================

pub fn create_tag(db: &Database, data: TagCreate) -> ServiceResult<Tag> {
    validate_non_empty("name", &data.name)?;
    validate_non_empty("slug", &data.slug)?;
    if !data
        .slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ServiceError::Validation(format!(
            "slug '{}' may only contain letters, digits, '-' and '_'",
            data.slug
        )));
    }
    if !is_valid_color(&data.color) {
        return Err(ServiceError::Validation(format!(
            "color '{}' must be a #rrggbb hex value",
            data.color
        )));
    }

    let conn = db.get_conn()?;
    let tag = Tag::create(&conn, &data).map_err(|e| {
        if e.is_constraint_violation() {
            ServiceError::Conflict(format!("Tag with slug '{}' already exists", data.slug))
        } else {
            e.into()
        }
    })?;
    info!(tag_id = tag.id, slug = %tag.slug, "created tag");
    Ok(tag)
}

pub fn list_tags(db: &Database) -> ServiceResult<Vec<Tag>> {
    let conn = db.get_conn()?;
    Ok(Tag::list(&conn)?)
}

pub fn get_tag(db: &Database, id: i64) -> ServiceResult<Tag> {
    let conn = db.get_conn()?;
    Tag::get_by_id(&conn, id)?.ok_or_else(|| ServiceError::NotFound(format!("Tag {} not found", id)))
}

// ============================================================================
// Ingredients
// ============================================================================

fn validate_ingredient(data: &IngredientCreate) -> ServiceResult<()> {
    validate_non_empty("name", &data.name)?;
    validate_non_empty("measurement_unit", &data.measurement_unit)
}

pub fn create_ingredient(db: &Database, data: IngredientCreate) -> ServiceResult<Ingredient> {
    validate_ingredient(&data)?;
    let conn = db.get_conn()?;
    let ingredient = Ingredient::create(&conn, &data)?;
    info!(ingredient_id = ingredient.id, name = %ingredient.name, "created ingredient");
    Ok(ingredient)
}

/// List ingredients, optionally by case-insensitive name prefix
pub fn list_ingredients(db: &Database, name: Option<&str>) -> ServiceResult<Vec<Ingredient>> {
    let conn = db.get_conn()?;
    Ok(Ingredient::list(&conn, name)?)
}

pub fn get_ingredient(db: &Database, id: i64) -> ServiceResult<Ingredient> {
    let conn = db.get_conn()?;
    Ingredient::get_by_id(&conn, id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Ingredient {} not found", id)))
}

/// Bulk-load catalog entries in a single transaction; any invalid item aborts the load
pub fn load_ingredients(
    db: &Database,
    items: &[IngredientCreate],
) -> ServiceResult<LoadIngredientsResponse> {
    for (index, item) in items.iter().enumerate() {
        validate_ingredient(item)
            .map_err(|e| ServiceError::Validation(format!("item {}: {}", index, e)))?;
    }

    let loaded = db.with_transaction(|tx| Ingredient::bulk_create(tx, items))?;
    let conn = db.get_conn()?;
    let total_in_catalog = Ingredient::count(&conn)?;

    info!(loaded, total_in_catalog, "loaded ingredient catalog");
    Ok(LoadIngredientsResponse {
        loaded,
        total_in_catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;

    #[test]
    fn test_tag_validation_and_uniqueness() {
        let (_dir, db) = temp_database();
        let tag = TagCreate {
            name: "Breakfast".into(),
            color: "#E26C2D".into(),
            slug: "breakfast".into(),
        };
        create_tag(&db, tag.clone()).unwrap();

        let err = create_tag(&db, tag).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let bad_color = TagCreate {
            name: "Lunch".into(),
            color: "orange".into(),
            slug: "lunch".into(),
        };
        assert!(matches!(create_tag(&db, bad_color), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let (_dir, db) = temp_database();
        let items = vec![
            IngredientCreate { name: "salt".into(), measurement_unit: "g".into() },
            IngredientCreate { name: " ".into(), measurement_unit: "g".into() },
        ];
        assert!(load_ingredients(&db, &items).is_err());
        assert!(list_ingredients(&db, None).unwrap().is_empty());

        let response = load_ingredients(&db, &items[..1]).unwrap();
        assert_eq!(response.loaded, 1);
        assert_eq!(response.total_in_catalog, 1);
    }
}
