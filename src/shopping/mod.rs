//! Shopping list
//!
//! The planned-recipe set (shopping cart), the aggregation engine that merges the
//! composition of every planned recipe into one list, and the plain-text renderer
//! behind the `cart.txt` download.

pub mod aggregate;
pub mod planned;
pub mod render;

use thiserror::Error;

use crate::db::DbError;

pub use aggregate::{aggregate, build_shopping_report, AggregatedLine};
pub use planned::{add_planned, list_planned, remove_planned};
pub use render::{render, REPORT_CONTENT_DISPOSITION, REPORT_CONTENT_TYPE, REPORT_FILENAME};

/// Errors raised by the shopping list subsystem
#[derive(Debug, Error)]
pub enum ShoppingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Recipe {recipe_id} is already in the shopping cart")]
    AlreadyPlanned { recipe_id: i64 },

    #[error("Recipe {recipe_id} is not in the shopping cart")]
    NotPlanned { recipe_id: i64 },

    #[error("Total amount of '{name}' ({measurement_unit}) exceeds the representable range")]
    AggregationOverflow {
        name: String,
        measurement_unit: String,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl ShoppingError {
    pub(crate) fn user_not_found(id: i64) -> Self {
        ShoppingError::NotFound { entity: "User", id }
    }

    pub(crate) fn recipe_not_found(id: i64) -> Self {
        ShoppingError::NotFound { entity: "Recipe", id }
    }
}

impl From<rusqlite::Error> for ShoppingError {
    fn from(e: rusqlite::Error) -> Self {
        ShoppingError::Database(DbError::Sqlite(e))
    }
}

/// Result type for shopping list operations
pub type ShoppingResult<T> = Result<T, ShoppingError>;
