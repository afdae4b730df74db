//! Token authentication

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::models::User;
use crate::tools::users;
use super::{blocking, ApiError, AppState};

const TOKEN_PREFIX: &str = "Token ";

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| ApiError::Unauthorized)?;
    let token = value
        .strip_prefix(TOKEN_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    Ok(Some(token.to_string()))
}

/// Resolve the caller, or None for anonymous requests.
///
/// A header that is present but invalid is an error, not anonymity.
pub(crate) async fn optional_user(
    headers: &HeaderMap,
    state: &Arc<AppState>,
) -> Result<Option<User>, ApiError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(None);
    };
    let database = state.database.clone();
    let user = blocking(move || users::authenticate(&database, &token)).await?;
    match user {
        Some(user) => Ok(Some(user)),
        None => Err(ApiError::Unauthorized),
    }
}

/// Resolve the caller, rejecting anonymous requests
pub(crate) async fn require_user(
    headers: &HeaderMap,
    state: &Arc<AppState>,
) -> Result<User, ApiError> {
    optional_user(headers, state)
        .await?
        .ok_or(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc123".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(matches!(bearer_token(&headers), Err(ApiError::Unauthorized)));
    }
}
