use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections (bad JSON, wrong content type, wrong field types)
/// render as `AppError` 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
