use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use threadline_persist::PersistError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl ApiError {
    fn from_persist(error: &PersistError) -> (StatusCode, serde_json::Value) {
        match error.root() {
            PersistError::UserNotFound(_) | PersistError::ThreadNotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
            }
            PersistError::InvalidObjectId(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": error.to_string() }))
            }
            PersistError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error.to_string(), "issues": errors.issues }),
            ),
            _ => {
                tracing::error!("Persistence error: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Storage error" }),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::UserNotFound(_) | ApiError::ThreadNotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() }))
            }
            ApiError::Forbidden(_) => {
                (StatusCode::FORBIDDEN, json!({ "error": self.to_string() }))
            }
            ApiError::Persist(ref e) => Self::from_persist(e),
            ApiError::Template(ref e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Rendering error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
