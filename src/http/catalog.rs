//! Catalog routes
//!
//! Read-only tag and ingredient endpoints; no authentication required.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::tools::catalog;
use super::{blocking, ApiError, AppState};

#[derive(Debug, Deserialize, Default)]
struct IngredientQuery {
    #[serde(default)]
    name: Option<String>,
}

/// Tag and ingredient routes
pub struct CatalogRoutes;

impl CatalogRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/tags/", get(Self::handle_list_tags))
            .route("/tags/:id/", get(Self::handle_get_tag))
            .route("/ingredients/", get(Self::handle_list_ingredients))
            .route("/ingredients/:id/", get(Self::handle_get_ingredient))
            .with_state(state)
    }

    async fn handle_list_tags(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
        let database = state.database.clone();
        let tags = blocking(move || catalog::list_tags(&database)).await?;
        Ok(Json(tags).into_response())
    }

    async fn handle_get_tag(
        State(state): State<Arc<AppState>>,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let database = state.database.clone();
        let tag = blocking(move || catalog::get_tag(&database, id)).await?;
        Ok(Json(tag).into_response())
    }

    async fn handle_list_ingredients(
        State(state): State<Arc<AppState>>,
        Query(query): Query<IngredientQuery>,
    ) -> Result<Response, ApiError> {
        let database = state.database.clone();
        let ingredients =
            blocking(move || catalog::list_ingredients(&database, query.name.as_deref())).await?;
        Ok(Json(ingredients).into_response())
    }

    async fn handle_get_ingredient(
        State(state): State<Arc<AppState>>,
        Path(id): Path<i64>,
    ) -> Result<Response, ApiError> {
        let database = state.database.clone();
        let ingredient = blocking(move || catalog::get_ingredient(&database, id)).await?;
        Ok(Json(ingredient).into_response())
    }
}
