use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::extract::Path` with `AppError` rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
