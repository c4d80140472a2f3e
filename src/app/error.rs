//! Error type for the example handlers.
//!
//! Bridges routing, JSON and repository errors into HTTP responses with a
//! small JSON body (`{"code": ..., "message": ...}`).

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::books::RepositoryError;
use crate::routing::ParamError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("{0}")]
    Validation(String),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Param(_) => StatusCode::BAD_REQUEST,
            HandlerError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            HandlerError::Json(rejection) => rejection.status(),
            HandlerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            HandlerError::Param(_) => "BAD_REQUEST",
            HandlerError::Repository(_) => "NOT_FOUND",
            HandlerError::Json(_) => "INVALID_JSON",
            HandlerError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = %status, error = %self, "Handler rejected request");

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
