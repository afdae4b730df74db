//! Recipe routes
//!
//! Recipe CRUD, favourites, the shopping cart and the `cart.txt` download.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::models::{RecipeCreate, RecipeFilter, RecipeUpdate};
use crate::shopping::{REPORT_CONTENT_DISPOSITION, REPORT_CONTENT_TYPE};
use crate::tools::{recipes, shopping, social};
use super::auth::{optional_user, require_user};
use super::{blocking, ApiError, AppState};

/// Parsed `/recipes/` query string. `tags` may repeat.
#[derive(Debug, Default, PartialEq)]
struct RecipeListQuery {
    author: Option<i64>,
    tags: Vec<String>,
    is_favorited: bool,
    is_in_shopping_cart: bool,
    page: Option<i64>,
    limit: Option<i64>,
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ApiError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be 0 or 1, got '{}'",
            key, value
        ))),
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got '{}'", key, value)))
}

impl RecipeListQuery {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw.unwrap_or(""))
            .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e)))?;

        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "author" => query.author = Some(parse_int(&key, &value)?),
                "tags" => query.tags.push(value),
                "is_favorited" => query.is_favorited = parse_flag(&key, &value)?,
                "is_in_shopping_cart" => query.is_in_shopping_cart = parse_flag(&key, &value)?,
                "page" => query.page = Some(parse_int(&key, &value)?),
                "limit" => query.limit = Some(parse_int(&key, &value)?),
                _ => {}
            }
        }
        Ok(query)
    }
}

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/recipes/",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/recipes/download_shopping_cart/",
                get(Self::handle_download_shopping_cart),
            )
            .route(
                "/recipes/:id/",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/recipes/:id/favorite/",
                post(Self::handle_add_favorite).delete(Self::handle_remove_favorite),
            )
            .route(
                "/recipes/:id/shopping_cart/",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .with_state(state)
    }

    async fn handle_list(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        RawQuery(raw): RawQuery,
    ) -> Result<Response, ApiError> {
        let query = RecipeListQuery::parse(raw.as_deref())?;
        let viewer = optional_user(&headers, &state).await?.map(|u| u.id);

        let filter = RecipeFilter {
            author_id: query.author,
            tag_slugs: query.tags,
            viewer_id: viewer,
            is_favorited: query.is_favorited,
            is_in_shopping_cart: query.is_in_shopping_cart,
        };
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(state.page_size);

        let database = state.database.clone();
        let result =
            blocking(move || recipes::list_recipes(&database, &filter, page, limit)).await?;
        Ok(Json(result).into_response())
    }

    async fn handle_create(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(request): Json<RecipeCreate>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let recipe = blocking(move || recipes::create_recipe(&database, user.id, request)).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    async fn handle_get(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let viewer = optional_user(&headers, &state).await?.map(|u| u.id);
        let database = state.database.clone();
        let recipe = blocking(move || recipes::get_recipe(&database, id, viewer)).await?;
        Ok(Json(recipe).into_response())
    }

    async fn handle_update(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<RecipeUpdate>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let recipe =
            blocking(move || recipes::update_recipe(&database, user.id, id, request)).await?;
        Ok(Json(recipe).into_response())
    }

    async fn handle_delete(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        blocking(move || recipes::delete_recipe(&database, user.id, id)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_add_favorite(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let recipe = blocking(move || social::add_favorite(&database, user.id, id)).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    async fn handle_remove_favorite(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        blocking(move || social::remove_favorite(&database, user.id, id)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_add_to_cart(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let recipe =
            blocking(move || shopping::add_to_shopping_cart(&database, user.id, id)).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    async fn handle_remove_from_cart(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        blocking(move || shopping::remove_from_shopping_cart(&database, user.id, id)).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Serve the aggregated shopping list as `cart.txt`
    async fn handle_download_shopping_cart(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let user = require_user(&headers, &state).await?;
        let database = state.database.clone();
        let file = blocking(move || shopping::render_shopping_list(&database, user.id)).await?;

        info!(user_id = user.id, bytes = file.body.len(), "serving shopping list");
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, REPORT_CONTENT_TYPE),
                (header::CONTENT_DISPOSITION, REPORT_CONTENT_DISPOSITION),
            ],
            file.body,
        )
            .into_response())
    }
}
