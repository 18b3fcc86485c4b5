use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Environment variable not set error, {0}")]
    EnvironmentVariableNotSetError(String),
    #[error("File read error, {0}")]
    FileReadError(String),
    #[error("Sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Validation error, {0}")]
    ValidationError(String),
    #[error("Validation errors, {0}")]
    ValidatorValidationErrors(#[from] validator::ValidationErrors),
    #[error("Invalid query parameters, {0}")]
    QueryRejection(#[from] axum_extra::extract::QueryRejection),
    #[error("Invalid path parameters, {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Invalid json body, {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("{0}")]
    NotFoundError(String),
    #[error("Missing acces token error")]
    MissingAccessToken,
    #[error("{0} token required")]
    Unauthorized(String),
    #[error("jsonwebtoken error")]
    JsonWebTokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Forbidden, {0}")]
    Forbidden(String),
    #[error("Internal error, {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::EnvironmentVariableNotSetError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error",
                format!("Environment variable not set, {e}"),
            ),
            Self::FileReadError(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error", e),
            Self::SqlxError(e) => {
                error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error",
                    e.to_string(),
                )
            }
            Self::MigrateError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                e.to_string(),
            ),
            Self::ValidationError(e) => (StatusCode::BAD_REQUEST, "Validation error", e),
            Self::ValidatorValidationErrors(e) => {
                (StatusCode::BAD_REQUEST, "Validation error", e.to_string())
            }
            Self::QueryRejection(e) => (StatusCode::BAD_REQUEST, "Validation error", e.to_string()),
            Self::PathRejection(e) => (StatusCode::BAD_REQUEST, "Validation error", e.body_text()),
            Self::JsonRejection(e) => (StatusCode::BAD_REQUEST, "Validation error", e.body_text()),
            Self::NotFoundError(e) => (StatusCode::NOT_FOUND, "Not found", e),
            Self::MissingAccessToken => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Missing access token".to_string(),
            ),
            Self::Unauthorized(e) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                format!("{e} token required"),
            ),
            Self::JsonWebTokenError(e) => (StatusCode::UNAUTHORIZED, "Unauthorized", e.to_string()),
            Self::Forbidden(e) => (StatusCode::FORBIDDEN, "Forbidden", e),
            Self::InternalError(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error", e),
        };

        let body = Json(json!({"error": error, "message": message}));

        (status, body).into_response()
    }
}
