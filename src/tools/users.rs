//! User tools
//!
//! Registration and token authentication.

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{Follow, User, UserCreate};
use super::{validate_non_empty, ServiceError, ServiceResult};

/// Public view of a user, as seen by `viewer`
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// Response for create_user
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub auth_token: String,
}

impl UserProfile {
    pub(crate) fn build(
        conn: &rusqlite::Connection,
        user: User,
        viewer_id: Option<i64>,
    ) -> ServiceResult<Self> {
        let is_subscribed = match viewer_id {
            Some(viewer) => Follow::exists(conn, viewer, user.id)?,
            None => false,
        };
        Ok(Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        })
    }
}

/// Register a user and issue their API token
pub fn create_user(db: &Database, data: UserCreate) -> ServiceResult<RegisteredUser> {
    validate_non_empty("email", &data.email)?;
    validate_non_empty("username", &data.username)?;
    validate_non_empty("first_name", &data.first_name)?;
    validate_non_empty("last_name", &data.last_name)?;
    if !data.email.contains('@') {
        return Err(ServiceError::Validation(format!(
            "'{}' is not a valid email address",
            data.email
        )));
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    let conn = db.get_conn()?;
    let user = User::create(&conn, &data, &token).map_err(|e| {
        if e.is_constraint_violation() {
            ServiceError::Conflict("A user with this email or username already exists".into())
        } else {
            e.into()
        }
    })?;

    info!(user_id = user.id, username = %user.username, "registered user");
    Ok(RegisteredUser {
        id: user.id,
        email: user.email,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        auth_token: token,
    })
}

/// Resolve an API token; None when it is unknown
pub fn authenticate(db: &Database, token: &str) -> ServiceResult<Option<User>> {
    let conn = db.get_conn()?;
    Ok(User::get_by_token(&conn, token)?)
}

/// Get a user profile as seen by `viewer_id`
pub fn get_user(db: &Database, id: i64, viewer_id: Option<i64>) -> ServiceResult<UserProfile> {
    let conn = db.get_conn()?;
    let user = User::get_by_id(&conn, id)?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))?;
    UserProfile::build(&conn, user, viewer_id)
}
