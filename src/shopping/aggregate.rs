//! Aggregation engine
//!
//! Joins a user's planned recipes with their composition and collapses the
//! entries into one line per `(name, measurement_unit)` with the amounts summed.
//! Units are never converted: "milk, l" and "milk, g" stay separate lines.

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Recipe, RecipeIngredient, RecipeIngredientDetail, User};
use super::planned::list_planned;
use super::{ShoppingError, ShoppingResult};

/// One row of the shopping report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl fmt::Display for AggregatedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}, {}", self.name, self.amount, self.measurement_unit)
    }
}

/// Group composition entries by ingredient identity and sum their amounts.
///
/// Lines come out ordered by name, then unit, both in byte order, regardless of the
/// order of the input.
pub fn aggregate<I>(entries: I) -> ShoppingResult<Vec<AggregatedLine>>
where
    I: IntoIterator<Item = RecipeIngredientDetail>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for entry in entries {
        let total = totals
            .entry((entry.name.clone(), entry.measurement_unit.clone()))
            .or_insert(0);
        *total = total
            .checked_add(entry.amount)
            .ok_or_else(|| ShoppingError::AggregationOverflow {
                name: entry.name,
                measurement_unit: entry.measurement_unit,
            })?;
    }

    Ok(totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| AggregatedLine {
            name,
            measurement_unit,
            amount,
        })
        .collect())
}

/// Build the shopping report for one user.
///
/// Read-only. When called outside a transaction all reads share one snapshot, so a
/// concurrent recipe edit is seen either entirely or not at all. A planned recipe
/// that cannot be read aborts the whole report.
pub fn build_shopping_report(
    conn: &Connection,
    user_id: i64,
) -> ShoppingResult<Vec<AggregatedLine>> {
    let _snapshot = if conn.is_autocommit() {
        Some(conn.unchecked_transaction()?)
    } else {
        None
    };

    if !User::exists(conn, user_id)? {
        return Err(ShoppingError::user_not_found(user_id));
    }

    let planned = list_planned(conn, user_id)?;
    if planned.is_empty() {
        debug!(user_id, "shopping cart is empty");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for recipe_id in &planned {
        if !Recipe::exists(conn, *recipe_id)? {
            return Err(ShoppingError::recipe_not_found(*recipe_id));
        }
        entries.extend(RecipeIngredient::get_details_for_recipe(conn, *recipe_id)?);
    }

    let lines = aggregate(entries)?;
    info!(
        user_id,
        recipes = planned.len(),
        lines = lines.len(),
        "built shopping report"
    );
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::{
        CompositionEntryCreate, Ingredient, IngredientCreate, RecipeCreate, RecipeUpdate,
        UserCreate,
    };
    use crate::shopping::{add_planned, remove_planned, render};

    fn detail(name: &str, unit: &str, amount: i64) -> RecipeIngredientDetail {
        RecipeIngredientDetail {
            id: 0,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn line(name: &str, unit: &str, amount: i64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    struct Kitchen {
        user_id: i64,
        ingredients: Vec<Ingredient>,
    }

    impl Kitchen {
        fn new(conn: &Connection, username: &str) -> Self {
            let user = User::create(
                conn,
                &UserCreate {
                    email: format!("{}@example.com", username),
                    username: username.to_string(),
                    first_name: "Test".into(),
                    last_name: "User".into(),
                },
                &format!("{}-token", username),
            )
            .unwrap();
            Self {
                user_id: user.id,
                ingredients: Vec::new(),
            }
        }

        fn ingredient(&mut self, conn: &Connection, name: &str, unit: &str) -> i64 {
            if let Some(existing) = self
                .ingredients
                .iter()
                .find(|i| i.name == name && i.measurement_unit == unit)
            {
                return existing.id;
            }
            let created = Ingredient::create(
                conn,
                &IngredientCreate {
                    name: name.to_string(),
                    measurement_unit: unit.to_string(),
                },
            )
            .unwrap();
            let id = created.id;
            self.ingredients.push(created);
            id
        }

        fn recipe(&mut self, conn: &Connection, items: &[(&str, &str, i64)]) -> i64 {
            let ingredients = items
                .iter()
                .map(|(name, unit, amount)| CompositionEntryCreate {
                    ingredient_id: self.ingredient(conn, name, unit),
                    amount: *amount,
                })
                .collect();
            Recipe::create(
                conn,
                self.user_id,
                &RecipeCreate {
                    name: "recipe".into(),
                    text: "text".into(),
                    cooking_time: 15,
                    image: None,
                    tags: vec![],
                    ingredients,
                },
            )
            .unwrap()
            .id
        }
    }

    #[test]
    fn test_aggregate_merges_same_identity() {
        let lines = aggregate(vec![
            detail("sugar", "g", 50),
            detail("flour", "g", 200),
            detail("flour", "g", 300),
        ])
        .unwrap();
        assert_eq!(lines, vec![line("flour", "g", 500), line("sugar", "g", 50)]);
    }

    #[test]
    fn test_aggregate_keeps_units_apart() {
        let lines = aggregate(vec![detail("milk", "l", 1), detail("milk", "g", 200)]).unwrap();
        assert_eq!(lines, vec![line("milk", "g", 200), line("milk", "l", 1)]);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let forward = vec![
            detail("eggs", "pcs", 2),
            detail("Butter", "g", 30),
            detail("eggs", "pcs", 3),
            detail("apple", "pcs", 1),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(forward).unwrap();
        let b = aggregate(reversed).unwrap();
        assert_eq!(a, b);
        // Byte order: uppercase sorts before lowercase
        let names: Vec<_> = a.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Butter", "apple", "eggs"]);
        assert_eq!(a[2].amount, 5);
    }

    #[test]
    fn test_aggregate_overflow_is_reported() {
        let err = aggregate(vec![
            detail("salt", "g", 1),
            detail("water", "ml", i64::MAX),
            detail("water", "ml", 1),
        ])
        .unwrap_err();
        match err {
            ShoppingError::AggregationOverflow {
                name,
                measurement_unit,
            } => {
                assert_eq!(name, "water");
                assert_eq!(measurement_unit, "ml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_cart_gives_empty_report() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let kitchen = Kitchen::new(&conn, "empty");

        assert!(build_shopping_report(&conn, kitchen.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();

        let err = build_shopping_report(&conn, 42).unwrap_err();
        assert!(matches!(err, ShoppingError::NotFound { entity: "User", id: 42 }));
    }

    #[test]
    fn test_flour_and_sugar_report() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut kitchen = Kitchen::new(&conn, "baker");

        let r1 = kitchen.recipe(&conn, &[("flour", "g", 200)]);
        let r2 = kitchen.recipe(&conn, &[("flour", "g", 300), ("sugar", "g", 50)]);
        add_planned(&conn, kitchen.user_id, r1).unwrap();
        add_planned(&conn, kitchen.user_id, r2).unwrap();

        let lines = build_shopping_report(&conn, kitchen.user_id).unwrap();
        assert_eq!(render(&lines), b"flour: 500, g\nsugar: 50, g\n".to_vec());
    }

    #[test]
    fn test_same_name_different_units_report() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut kitchen = Kitchen::new(&conn, "dairy");

        let r3 = kitchen.recipe(&conn, &[("milk", "l", 1)]);
        let r4 = kitchen.recipe(&conn, &[("milk", "g", 200)]);
        add_planned(&conn, kitchen.user_id, r3).unwrap();
        add_planned(&conn, kitchen.user_id, r4).unwrap();

        let lines = build_shopping_report(&conn, kitchen.user_id).unwrap();
        assert_eq!(render(&lines), b"milk: 200, g\nmilk: 1, l\n".to_vec());
    }

    #[test]
    fn test_distinct_catalog_rows_with_same_identity_merge() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let kitchen = Kitchen::new(&conn, "dupes");

        // Two catalog rows that happen to share name and unit
        let a = Ingredient::create(
            &conn,
            &IngredientCreate { name: "rice".into(), measurement_unit: "g".into() },
        )
        .unwrap();
        let b = Ingredient::create(
            &conn,
            &IngredientCreate { name: "rice".into(), measurement_unit: "g".into() },
        )
        .unwrap();
        let recipe = Recipe::create(
            &conn,
            kitchen.user_id,
            &RecipeCreate {
                name: "pilaf".into(),
                text: "text".into(),
                cooking_time: 40,
                image: None,
                tags: vec![],
                ingredients: vec![
                    CompositionEntryCreate { ingredient_id: a.id, amount: 100 },
                    CompositionEntryCreate { ingredient_id: b.id, amount: 150 },
                ],
            },
        )
        .unwrap();
        add_planned(&conn, kitchen.user_id, recipe.id).unwrap();

        let lines = build_shopping_report(&conn, kitchen.user_id).unwrap();
        assert_eq!(lines, vec![line("rice", "g", 250)]);
    }

    #[test]
    fn test_removed_recipe_is_excluded() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut kitchen = Kitchen::new(&conn, "remover");

        let r1 = kitchen.recipe(&conn, &[("flour", "g", 200)]);
        let r2 = kitchen.recipe(&conn, &[("flour", "g", 300), ("sugar", "g", 50)]);
        add_planned(&conn, kitchen.user_id, r1).unwrap();
        add_planned(&conn, kitchen.user_id, r2).unwrap();
        remove_planned(&conn, kitchen.user_id, r2).unwrap();

        let lines = build_shopping_report(&conn, kitchen.user_id).unwrap();
        assert_eq!(lines, vec![line("flour", "g", 200)]);
    }

    #[test]
    fn test_reports_are_scoped_per_user() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut alice = Kitchen::new(&conn, "alice");
        let bob = Kitchen::new(&conn, "bob");

        let soup = alice.recipe(&conn, &[("onion", "pcs", 2)]);
        add_planned(&conn, alice.user_id, soup).unwrap();
        add_planned(&conn, bob.user_id, soup).unwrap();
        remove_planned(&conn, bob.user_id, soup).unwrap();

        assert_eq!(
            build_shopping_report(&conn, alice.user_id).unwrap(),
            vec![line("onion", "pcs", 2)]
        );
        assert!(build_shopping_report(&conn, bob.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_report_is_idempotent_and_read_only() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut kitchen = Kitchen::new(&conn, "repeat");

        let r1 = kitchen.recipe(&conn, &[("tomato", "pcs", 3), ("basil", "g", 10)]);
        add_planned(&conn, kitchen.user_id, r1).unwrap();

        let first = render(&build_shopping_report(&conn, kitchen.user_id).unwrap());
        let second = render(&build_shopping_report(&conn, kitchen.user_id).unwrap());
        assert_eq!(first, second);
        assert_eq!(list_planned(&conn, kitchen.user_id).unwrap(), vec![r1]);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn test_report_follows_recipe_edits() {
        let (_dir, db) = temp_database();
        let conn = db.get_conn().unwrap();
        let mut kitchen = Kitchen::new(&conn, "editor");

        let r1 = kitchen.recipe(&conn, &[("flour", "g", 200)]);
        add_planned(&conn, kitchen.user_id, r1).unwrap();

        let sugar = kitchen.ingredient(&conn, "sugar", "g");
        Recipe::update(
            &conn,
            r1,
            &RecipeUpdate {
                ingredients: Some(vec![CompositionEntryCreate { ingredient_id: sugar, amount: 20 }]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            build_shopping_report(&conn, kitchen.user_id).unwrap(),
            vec![line("sugar", "g", 20)]
        );
    }
}
