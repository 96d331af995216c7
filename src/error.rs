use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

const INTERNAL_DETAIL: &str = "Erro interno do servidor";

/// AppError
///
/// The single error taxonomy of the API boundary. Every handler and extractor returns
/// it, and `IntoResponse` turns it into a `{"detail": ...}` body with the matching
/// status code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input (400).
    #[error("{0}")]
    Validation(String),
    /// Missing, invalid or expired token, or bad login credentials (401).
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    /// Known path, unsupported method (405).
    #[error("{0}")]
    MethodNotAllowed(String),
    /// Duplicate unique field, such as an admin email (409).
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The uniform rejection for any bearer-token resolution failure.
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Credenciais inválidas".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures are logged in full but never echoed to the client.
        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database failure");
                INTERNAL_DETAIL.to_string()
            }
            AppError::Internal(message) => {
                tracing::error!(%message, "internal failure");
                INTERNAL_DETAIL.to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(ErrorResponse { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
