use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

/// Crate-wide request error. Each variant maps to one slot of the error
/// taxonomy: validation -> 400, auth -> 401, unknown or cross-tenant id
/// -> 404, everything else -> 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self::Internal {
            message: "Internal server error".into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, raw) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized".into(), msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), msg),
            AppError::Internal { message, source } => {
                error!(error = %source, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, format!("{source:#}"))
            }
        };
        (status, ApiResponse::error(message, raw)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_status() {
        let cases = [
            (AppError::validation("bad body"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("no token"), StatusCode::UNAUTHORIZED),
            (AppError::not_found("target not found"), StatusCode::NOT_FOUND),
            (
                AppError::internal("Failed to scan", anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
