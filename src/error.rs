use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    response::{ErrorBody, MessageBody, ValidationErrorBody},
    validation::ValidationErrors,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),
}

impl AppError {
    /// `NotFound` with the usual "<Entity> not found" message.
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{entity} not found"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(validation_errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorBody { validation_errors }),
            )
                .into_response(),
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageBody::new(message))).into_response()
            }
            AppError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageBody::new(message))).into_response()
            }
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                let body = ErrorBody {
                    error: "Internal Server Error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
