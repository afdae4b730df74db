//! Foodgram service operations
//!
//! Validation and response shaping shared by the MCP tools and the HTTP routes.
//! Every user-scoped operation takes the acting user's id explicitly.

pub mod catalog;
pub mod recipes;
pub mod shopping;
pub mod social;
pub mod status;
pub mod users;

use thiserror::Error;

use crate::db::DbError;
use crate::shopping::ShoppingError;

/// Errors returned by service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// Membership that already exists, or one that cannot be created
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Shopping(#[from] ShoppingError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Database(DbError::Sqlite(e))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn validate_non_empty(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
