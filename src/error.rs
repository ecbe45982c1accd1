/*
 * Responsibility
 * - the application-wide AppError
 * - IntoResponse (HTTP status / `{message, error?}` JSON body)
 * - fold repo / identity / blob errors into AppError in one place
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::blob::BlobError;
use crate::services::identity::IdentityError;

pub const EMAIL_TAKEN: &str = "Email already registered. Please use a different email.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("{message}")]
    Unauthorized {
        message: String,
        detail: Option<String>,
    },
    #[error("{message}")]
    Conflict { message: String },
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("too many requests")]
    TooManyRequests,
    #[error("upstream service unavailable")]
    Upstream,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            detail: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::Unauthorized { message, detail } => {
                (StatusCode::UNAUTHORIZED, message, detail)
            }
            // Duplicate keys surface as 400, same as any other rejected input.
            AppError::Conflict { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"), None)
            }
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later.".into(),
                None,
            ),
            AppError::Upstream | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
                None,
            ),
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("Record already exists"),
            RepoError::Db(err) if is_unreachable(&err) => {
                tracing::error!(error = ?err, "database unreachable");
                AppError::Upstream
            }
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

fn is_unreachable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
    )
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Unauthenticated(reason) => AppError::Unauthorized {
                message: "Invalid token".into(),
                detail: Some(reason),
            },
            IdentityError::EmailExists => AppError::conflict(EMAIL_TAKEN),
            IdentityError::Rejected(reason) => AppError::bad_request(reason),
            IdentityError::Upstream(reason) => {
                tracing::error!(%reason, "identity provider call failed");
                AppError::Upstream
            }
        }
    }
}

// Extractor rejections are client mistakes: always 400 with the JSON error body,
// never axum's plain-text 415/422.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<BlobError> for AppError {
    fn from(e: BlobError) -> Self {
        tracing::error!(error = ?e, "blob store failure");
        AppError::Internal
    }
}
