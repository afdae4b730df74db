//! Planned-recipe set
//!
//! Membership of recipes in a user's shopping cart. Adding a recipe twice is
//! rejected with `AlreadyPlanned`; removing an absent one with `NotPlanned`.

use rusqlite::Connection;
use tracing::debug;

use crate::models::{Recipe, ShoppingCartEntry, User};
use super::{ShoppingError, ShoppingResult};

/// Put a recipe into the user's shopping cart
pub fn add_planned(
    conn: &Connection,
    user_id: i64,
    recipe_id: i64,
) -> ShoppingResult<ShoppingCartEntry> {
    if !User::exists(conn, user_id)? {
        return Err(ShoppingError::user_not_found(user_id));
    }
    if !Recipe::exists(conn, recipe_id)? {
        return Err(ShoppingError::recipe_not_found(recipe_id));
    }
    if ShoppingCartEntry::get(conn, user_id, recipe_id)?.is_some() {
        return Err(ShoppingError::AlreadyPlanned { recipe_id });
    }

    // A concurrent add can still hit the UNIQUE constraint after the check above
    let entry = ShoppingCartEntry::insert(conn, user_id, recipe_id).map_err(|e| {
        if e.is_constraint_violation() {
            ShoppingError::AlreadyPlanned { recipe_id }
        } else {
            e.into()
        }
    })?;

    debug!(user_id, recipe_id, "recipe added to shopping cart");
    Ok(entry)
}

/// Take a recipe out of the user's shopping cart
pub fn remove_planned(conn: &Connection, user_id: i64, recipe_id: i64) -> ShoppingResult<()> {
    if !ShoppingCartEntry::delete(conn, user_id, recipe_id)? {
        return Err(ShoppingError::NotPlanned { recipe_id });
    }
    debug!(user_id, recipe_id, "recipe removed from shopping cart");
    Ok(())
}

/// Planned recipe ids, most recently added first
pub fn list_planned(conn: &Connection, user_id: i64) -> ShoppingResult<Vec<i64>> {
    Ok(ShoppingCartEntry::recipe_ids_for_user(conn, user_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::{RecipeCreate, UserCreate};

    fn seed(conn: &Connection) -> (i64, Vec<i64>) {
        let user = User::create(
            conn,
            &UserCreate {
                email: "planner@example.com".into(),
                username: "planner".into(),
                first_name: "Pat".into(),
                last_name: "Planner".into(),
            },
            "planner-token",
        )
        .unwrap();

        let recipes = (1..=3)
            .map(|n| {
                Recipe::create(
                    conn,
                    user.id,
                    &RecipeCreate {
                        name: format!("Recipe {}", n),
                        text: "text".into(),
                        cooking_time: 10,
                        image: None,
                        tags: vec![],
                        ingredients: vec![],
                    },
                )
                .unwrap()
                .id
            })
            .collect();
        (user.id, recipes)
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let (user_id, recipes) = seed(&conn);

        add_planned(&conn, user_id, recipes[1]).unwrap();
        add_planned(&conn, user_id, recipes[0]).unwrap();
        add_planned(&conn, user_id, recipes[2]).unwrap();

        assert_eq!(
            list_planned(&conn, user_id).unwrap(),
            vec![recipes[2], recipes[0], recipes[1]]
        );
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let (user_id, recipes) = seed(&conn);

        add_planned(&conn, user_id, recipes[0]).unwrap();
        let err = add_planned(&conn, user_id, recipes[0]).unwrap_err();
        assert!(matches!(err, ShoppingError::AlreadyPlanned { recipe_id } if recipe_id == recipes[0]));

        // The rejected add left exactly one membership behind
        assert_eq!(list_planned(&conn, user_id).unwrap(), vec![recipes[0]]);
    }

    #[test]
    fn test_missing_recipe_and_user() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let (user_id, _) = seed(&conn);

        let err = add_planned(&conn, user_id, 999).unwrap_err();
        assert!(matches!(err, ShoppingError::NotFound { entity: "Recipe", id: 999 }));

        let err = add_planned(&conn, 999, 1).unwrap_err();
        assert!(matches!(err, ShoppingError::NotFound { entity: "User", id: 999 }));
    }

    #[test]
    fn test_remove_absent_is_not_planned() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let (user_id, recipes) = seed(&conn);

        let err = remove_planned(&conn, user_id, recipes[0]).unwrap_err();
        assert!(matches!(err, ShoppingError::NotPlanned { .. }));

        add_planned(&conn, user_id, recipes[0]).unwrap();
        remove_planned(&conn, user_id, recipes[0]).unwrap();
        assert!(list_planned(&conn, user_id).unwrap().is_empty());
    }

    #[test]
    fn test_deleting_recipe_drops_membership() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let (user_id, recipes) = seed(&conn);

        add_planned(&conn, user_id, recipes[0]).unwrap();
        Recipe::delete(&conn, recipes[0]).unwrap();
        assert!(list_planned(&conn, user_id).unwrap().is_empty());
    }
}
