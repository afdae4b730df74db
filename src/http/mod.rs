//! HTTP API
//!
//! JSON routes over the service layer plus the `cart.txt` shopping list download.
//! Clients authenticate with `Authorization: Token <key>`.

mod auth;
mod catalog;
mod error;
mod recipes;
mod users;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::tools::ServiceResult;

pub use catalog::CatalogRoutes;
pub use error::ApiError;
pub use recipes::RecipeRoutes;
pub use users::UserRoutes;

/// Shared state for all handlers
pub struct AppState {
    pub database: Database,
    pub page_size: i64,
}

/// Build the full application router
pub fn router(state: Arc<AppState>) -> Router {
    async fn health_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "version": crate::build_info::VERSION,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    Router::new()
        .route("/health", get(health_handler))
        .nest(
            "/api",
            UserRoutes::routes(state.clone())
                .merge(CatalogRoutes::routes(state.clone()))
                .merge(RecipeRoutes::routes(state)),
        )
        .layer(TraceLayer::new_for_http())
}

/// Run a blocking service call off the async executor
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}
