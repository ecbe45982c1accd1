/*
 * Responsibility
 * - /auth handlers: verify-token, register, login, profile
 * - JSON body -> DTO validate() -> service; errors flow out as AppError
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::dto::{
        auth::{
            LoginResponse, RegisterRequest, RegisterResponse, TokenRequest, VerifyTokenResponse,
        },
        users::ProfileResponse,
    },
    api::extractors::{AppJson, AuthCtxExtractor},
    error::AppError,
    state::AppState,
};

pub async fn verify_token(
    State(state): State<AppState>,
    AppJson(req): AppJson<TokenRequest>,
) -> Result<Json<VerifyTokenResponse>, AppError> {
    let token = req.validate().map_err(AppError::bad_request)?;

    let claims = state.identity.verify_token(&token).await.map_err(|err| {
        tracing::warn!(error = %err, "token verification failed");
        AppError::from(err)
    })?;

    Ok(Json(VerifyTokenResponse {
        message: "Token verified",
        user: claims,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let registration = req.validate().map_err(AppError::bad_request)?;

    let row = state.profiles.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user_id: row.id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<TokenRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = req.validate().map_err(AppError::bad_request)?;

    let row = state.profiles.login(&token).await?;
    tracing::info!(uid = %row.uid, "login");

    Ok(Json(LoginResponse {
        message: "Login successful",
        user: row.into(),
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = state.profiles.get_profile(ctx.uid()).await?;
    Ok(Json(row.into()))
}
