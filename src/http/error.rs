//! HTTP error mapping
//!
//! Converts service and shopping errors into status codes with a JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::shopping::ShoppingError;
use crate::tools::ServiceError;

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ShoppingError> for ApiError {
    fn from(e: ShoppingError) -> Self {
        ApiError::Service(ServiceError::Shopping(e))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Service(service) => match service {
                ServiceError::Validation(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Shopping(shopping) => match shopping {
                    ShoppingError::NotFound { .. } => StatusCode::NOT_FOUND,
                    ShoppingError::AlreadyPlanned { .. } | ShoppingError::NotPlanned { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    ShoppingError::AggregationOverflow { .. } | ShoppingError::Database(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
