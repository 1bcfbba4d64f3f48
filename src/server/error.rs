//! server::error
//!
//! HTTP error responses.
//!
//! Every error body has the same shape:
//!
//! ```json
//! { "error": { "code": "NOT_AUTHORIZED", "message": "..." }, "meta": { "request_id": "..." } }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::publish::PublishError;

/// Errors surfaced by the upload endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or wrong bearer secret.
    #[error("invalid authorization token")]
    Unauthorized,

    /// Malformed upload (missing query parameter, unreadable body).
    #[error("{0}")]
    BadRequest(String),

    /// The publication itself failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Publish(err) => match err {
                PublishError::Validation(_) => StatusCode::BAD_REQUEST,
                PublishError::NotAuthorized { .. } => StatusCode::UNAUTHORIZED,
                PublishError::RemoteConflict { .. } => StatusCode::CONFLICT,
                PublishError::RemoteFault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Publish(err) => err.code(),
        }
    }

    /// Render the error tagged with `request_id`.
    pub fn into_response_with_id(self, request_id: Uuid) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
            meta: ErrorMeta {
                request_id: request_id.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with_id(Uuid::new_v4())
    }
}
