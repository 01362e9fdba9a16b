use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{storage::StorageError, validation::ValidationErrors};

/// AppError
///
/// Every failure a request can end in. Services and handlers return `Result<T, AppError>`
/// and rely on `?` to lift repository (`sqlx::Error`) and storage failures into it.
/// The `IntoResponse` impl is the single place where error kinds become HTTP statuses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid credential, or the actor does not own the resource.
    #[error("{0}")]
    Unauthorized(String),

    /// The actor's role is not in the route's required set.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// A path or query parameter could not be parsed (e.g. a non-numeric id).
    #[error("{0}")]
    NotAcceptable(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Upload rejected: no file, or not a JPEG.
    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("could not allocate a free logo id after {0} attempts")]
    LogoIdExhausted(usize),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Storage(_) | AppError::LogoIdExhausted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// ErrorBody
///
/// JSON shape of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs; clients get the generic reason phrase.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
