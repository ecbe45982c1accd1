/*
 * Responsibility
 * - /user handlers
 *   - own profile (Bearer): get / upsert
 *   - directory by provider uid: list / get / update / delete
 */
use axum::{Json, extract::State};

use crate::{
    api::dto::users::{
        MessageResponse, ProfileResponse, UpdateAccountRequest, UpdateProfileRequest,
        UserSummary, UserUpdatedResponse,
    },
    api::extractors::{AppJson, AppPath, AuthCtxExtractor},
    error::AppError,
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let rows = state.profiles.list_profiles().await?;
    Ok(Json(rows.into_iter().map(UserSummary::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(uid): AppPath<String>,
) -> Result<Json<UserSummary>, AppError> {
    let row = state.profiles.get_profile(&uid).await.map_err(|err| match err {
        AppError::NotFound { .. } => AppError::not_found("User"),
        other => other,
    })?;
    Ok(Json(row.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AppPath(uid): AppPath<String>,
    AppJson(req): AppJson<UpdateAccountRequest>,
) -> Result<Json<UserUpdatedResponse<UserSummary>>, AppError> {
    let (name, email) = req.validate().map_err(AppError::bad_request)?;

    let row = state
        .profiles
        .update_account(&uid, name.as_deref(), email.as_deref())
        .await?;

    Ok(Json(UserUpdatedResponse {
        message: "User updated successfully",
        user: row.into(),
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(uid): AppPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.profiles.delete_profile(&uid).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

pub async fn get_own_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = state.profiles.get_profile(ctx.uid()).await?;
    Ok(Json(row.into()))
}

pub async fn update_own_profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserUpdatedResponse<ProfileResponse>>, AppError> {
    let fields = req.validate().map_err(AppError::bad_request)?;

    let row = state.profiles.upsert_profile(&ctx.claims, &fields).await?;

    Ok(Json(UserUpdatedResponse {
        message: "Profile updated successfully",
        user: row.into(),
    }))
}
