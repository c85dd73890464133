use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::validation::FieldError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Could not find record {0}")]
    NotFound(i64),

    #[error("{0}")]
    Business(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn duplicate_name(name: &str) -> Self {
        AppError::Business(format!("A course with name {} already exists.", name))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                errors,
            ),
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Could not find record {}", id),
                Vec::new(),
            ),
            AppError::Business(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    Vec::new(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    Vec::new(),
                )
            }
            AppError::Configuration(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Vec::new(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message,
            errors,
        });

        (status, body).into_response()
    }
}
