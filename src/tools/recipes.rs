//! Recipe tools
//!
//! Recipe CRUD. Composition and tags are replaced wholesale on update.

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{
    CompositionEntryCreate, Favorite, Ingredient, Recipe, RecipeCreate, RecipeFilter,
    RecipeIngredient, RecipeIngredientDetail, RecipeUpdate, ShoppingCartEntry, Tag, User,
};
use super::users::UserProfile;
use super::{validate_non_empty, ServiceError, ServiceResult};

/// Full recipe detail as seen by a (possibly anonymous) viewer
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientDetail>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i64,
}

/// Short recipe card used in membership responses and subscriptions
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i64,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One page of recipes
#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub count: i64,
    pub page: i64,
    pub limit: i64,
    pub results: Vec<RecipeDetail>,
}

pub(crate) fn build_detail(
    conn: &Connection,
    recipe: Recipe,
    viewer_id: Option<i64>,
) -> ServiceResult<RecipeDetail> {
    let author = User::get_by_id(conn, recipe.author_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", recipe.author_id)))?;
    let author = UserProfile::build(conn, author, viewer_id)?;

    let (is_favorited, is_in_shopping_cart) = match viewer_id {
        Some(viewer) => (
            Favorite::exists(conn, viewer, recipe.id)?,
            ShoppingCartEntry::get(conn, viewer, recipe.id)?.is_some(),
        ),
        None => (false, false),
    };

    Ok(RecipeDetail {
        id: recipe.id,
        tags: Tag::get_for_recipe(conn, recipe.id)?,
        author,
        ingredients: RecipeIngredient::get_details_for_recipe(conn, recipe.id)?,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

fn validate_cooking_time(cooking_time: i64) -> ServiceResult<()> {
    if cooking_time < 1 {
        return Err(ServiceError::Validation(
            "cooking_time must be at least 1 minute".to_string(),
        ));
    }
    Ok(())
}

/// Composition must be non-empty, positive, and reference existing ingredients
fn validate_composition(conn: &Connection, entries: &[CompositionEntryCreate]) -> ServiceResult<()> {
    if entries.is_empty() {
        return Err(ServiceError::Validation(
            "A recipe needs at least one ingredient".to_string(),
        ));
    }
    for entry in entries {
        if entry.amount < 1 {
            return Err(ServiceError::Validation(format!(
                "Amount for ingredient {} must be a positive integer",
                entry.ingredient_id
            )));
        }
        if Ingredient::get_by_id(conn, entry.ingredient_id)?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Ingredient {} not found",
                entry.ingredient_id
            )));
        }
    }
    Ok(())
}

fn validate_tags(conn: &Connection, tag_ids: &[i64]) -> ServiceResult<()> {
    for tag_id in tag_ids {
        if Tag::get_by_id(conn, *tag_id)?.is_none() {
            return Err(ServiceError::Validation(format!("Tag {} does not exist", tag_id)));
        }
    }
    Ok(())
}

/// Create a recipe authored by `author_id`
pub fn create_recipe(db: &Database, author_id: i64, data: RecipeCreate) -> ServiceResult<RecipeDetail> {
    validate_non_empty("name", &data.name)?;
    validate_non_empty("text", &data.text)?;
    validate_cooking_time(data.cooking_time)?;

    let mut conn = db.get_conn()?;
    let tx = conn.transaction()?;

    if !User::exists(&tx, author_id)? {
        return Err(ServiceError::NotFound(format!("User {} not found", author_id)));
    }
    validate_tags(&tx, &data.tags)?;
    validate_composition(&tx, &data.ingredients)?;

    let recipe = Recipe::create(&tx, author_id, &data)?;
    let detail = build_detail(&tx, recipe, Some(author_id))?;
    tx.commit()?;

    info!(recipe_id = detail.id, author_id, "created recipe");
    Ok(detail)
}

pub fn get_recipe(db: &Database, id: i64, viewer_id: Option<i64>) -> ServiceResult<RecipeDetail> {
    let conn = db.get_conn()?;
    let recipe = Recipe::get_by_id(&conn, id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))?;
    build_detail(&conn, recipe, viewer_id)
}

/// List recipes newest first. `page` is 1-based.
pub fn list_recipes(
    db: &Database,
    filter: &RecipeFilter,
    page: i64,
    limit: i64,
) -> ServiceResult<RecipePage> {
    let limit = limit.clamp(1, crate::config::MAX_PAGE_SIZE);
    let page = page.max(1);

    let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
        ServiceError::Validation(format!("page {} is out of range", page))
    })?;

    let conn = db.get_conn()?;
    let count = Recipe::count(&conn, filter)?;
    let recipes = Recipe::list(&conn, filter, limit, offset)?;

    let results = recipes
        .into_iter()
        .map(|recipe| build_detail(&conn, recipe, filter.viewer_id))
        .collect::<ServiceResult<Vec<_>>>()?;

    Ok(RecipePage {
        count,
        page,
        limit,
        results,
    })
}

fn load_owned_recipe(conn: &Connection, user_id: i64, id: i64) -> ServiceResult<Recipe> {
    let recipe = Recipe::get_by_id(conn, id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))?;
    if recipe.author_id != user_id {
        return Err(ServiceError::Forbidden(
            "Only the author can modify this recipe".to_string(),
        ));
    }
    Ok(recipe)
}

/// Update a recipe; only its author may do so
pub fn update_recipe(
    db: &Database,
    user_id: i64,
    id: i64,
    data: RecipeUpdate,
) -> ServiceResult<RecipeDetail> {
    if let Some(ref name) = data.name {
        validate_non_empty("name", name)?;
    }
    if let Some(ref text) = data.text {
        validate_non_empty("text", text)?;
    }
    if let Some(cooking_time) = data.cooking_time {
        validate_cooking_time(cooking_time)?;
    }

    let mut conn = db.get_conn()?;
    let tx = conn.transaction()?;

    load_owned_recipe(&tx, user_id, id)?;
    if let Some(ref tags) = data.tags {
        validate_tags(&tx, tags)?;
    }
    if let Some(ref ingredients) = data.ingredients {
        validate_composition(&tx, ingredients)?;
    }

    let recipe = Recipe::update(&tx, id, &data)?
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))?;
    let detail = build_detail(&tx, recipe, Some(user_id))?;
    tx.commit()?;

    info!(recipe_id = id, user_id, "updated recipe");
    Ok(detail)
}

/// Delete a recipe; only its author may do so
pub fn delete_recipe(db: &Database, user_id: i64, id: i64) -> ServiceResult<()> {
    let conn = db.get_conn()?;
    load_owned_recipe(&conn, user_id, id)?;
    Recipe::delete(&conn, id)?;
    info!(recipe_id = id, user_id, "deleted recipe");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::{IngredientCreate, TagCreate, UserCreate};
    use crate::tools::{catalog, users};

    fn register(db: &Database, name: &str) -> i64 {
        users::create_user(
            db,
            UserCreate {
                email: format!("{}@example.com", name),
                username: name.to_string(),
                first_name: "First".into(),
                last_name: "Last".into(),
            },
        )
        .unwrap()
        .id
    }

    fn draft(ingredient_id: i64, tags: Vec<i64>) -> RecipeCreate {
        RecipeCreate {
            name: "Pancakes".into(),
            text: "Mix and fry".into(),
            cooking_time: 20,
            image: None,
            tags,
            ingredients: vec![CompositionEntryCreate { ingredient_id, amount: 250 }],
        }
    }

    #[test]
    fn test_create_and_filter_by_tag() {
        let (_dir, db) = temp_database();
        let author = register(&db, "author");
        let flour = catalog::create_ingredient(
            &db,
            IngredientCreate { name: "flour".into(), measurement_unit: "g".into() },
        )
        .unwrap();
        let breakfast = catalog::create_tag(
            &db,
            TagCreate { name: "Breakfast".into(), color: "#ffcc00".into(), slug: "breakfast".into() },
        )
        .unwrap();

        let tagged = create_recipe(&db, author, draft(flour.id, vec![breakfast.id])).unwrap();
        create_recipe(&db, author, draft(flour.id, vec![])).unwrap();

        assert_eq!(tagged.tags, vec![breakfast]);
        assert_eq!(tagged.ingredients[0].name, "flour");

        let filter = RecipeFilter {
            tag_slugs: vec!["breakfast".into()],
            ..Default::default()
        };
        let page = list_recipes(&db, &filter, 1, 10).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, tagged.id);

        let all = list_recipes(&db, &RecipeFilter::default(), 1, 10).unwrap();
        assert_eq!(all.count, 2);
        // Newest first
        assert!(all.results[0].id > all.results[1].id);
    }

    #[test]
    fn test_validation_failures_write_nothing() {
        let (_dir, db) = temp_database();
        let author = register(&db, "author");

        let err = create_recipe(&db, author, draft(777, vec![])).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let mut no_ingredients = draft(1, vec![]);
        no_ingredients.ingredients.clear();
        assert!(matches!(
            create_recipe(&db, author, no_ingredients),
            Err(ServiceError::Validation(_))
        ));

        let all = list_recipes(&db, &RecipeFilter::default(), 1, 10).unwrap();
        assert_eq!(all.count, 0);
    }

    #[test]
    fn test_only_author_can_modify() {
        let (_dir, db) = temp_database();
        let author = register(&db, "author");
        let stranger = register(&db, "stranger");
        let salt = catalog::create_ingredient(
            &db,
            IngredientCreate { name: "salt".into(), measurement_unit: "g".into() },
        )
        .unwrap();
        let recipe = create_recipe(&db, author, draft(salt.id, vec![])).unwrap();

        let err = update_recipe(&db, stranger, recipe.id, RecipeUpdate::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(matches!(
            delete_recipe(&db, stranger, recipe.id),
            Err(ServiceError::Forbidden(_))
        ));

        delete_recipe(&db, author, recipe.id).unwrap();
        assert!(matches!(
            get_recipe(&db, recipe.id, None),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_page_beyond_offset_range_is_rejected() {
        let (_dir, db) = temp_database();

        let err = list_recipes(&db, &RecipeFilter::default(), i64::MAX, 100).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Large but representable pages are simply empty
        let far = list_recipes(&db, &RecipeFilter::default(), i64::MAX / 100, 100).unwrap();
        assert!(far.results.is_empty());
        assert_eq!(far.page, i64::MAX / 100);
    }
}
