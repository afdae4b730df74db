//! User routes
//!
//! Registration, profiles and author subscriptions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::models::UserCreate;
use crate::tools::{social, users};
use super::auth::{optional_user, require_user};
use super::{blocking, ApiError, AppState};

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/users/", post(Self::handle_register))
            .route("/users/me/", get(Self::handle_me))
            .route("/users/subscriptions/", get(Self::handle_subscriptions))
            .route("/users/:id/", get(Self::handle_get_user))
            .route(
                "/users/:id/subscribe/",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(state)
    }

    async fn handle_register(
        State(state): State<Arc<AppState>>,
        Json(request): Json<UserCreate>,
    ) -> Result<Response, ApiError> {
        let database = state.database.clone();
        let registered = blocking(move || users::create_user(&database, request)).await?;
        Ok((StatusCode::CREATED, Json(registered)).into_response())
    }

    async fn handle_me(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let profile = blocking(move || users::get_user(&database, user.id, Some(user.id))).await?;
        Ok(Json(profile).into_response())
    }

    async fn handle_get_user(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let viewer = optional_user(&headers, &state).await?.map(|u| u.id);
        let database = state.database.clone();
        let profile = blocking(move || users::get_user(&database, id, viewer)).await?;
        Ok(Json(profile).into_response())
    }

    async fn handle_subscriptions(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let subscriptions =
            blocking(move || social::list_subscriptions(&database, user.id)).await?;
        Ok(Json(subscriptions).into_response())
    }

    async fn handle_subscribe(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(author_id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let subscription =
            blocking(move || social::subscribe(&database, user.id, author_id)).await?;
        Ok((StatusCode::CREATED, Json(subscription)).into_response())
    }

    async fn handle_unsubscribe(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(author_id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        blocking(move || social::unsubscribe(&database, user.id, author_id)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
