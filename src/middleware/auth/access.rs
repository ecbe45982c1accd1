//! Bearer token -> identity provider verification -> AuthCtx in request extensions.
//!
//! Only mounted on the protected sub-router (`route_layer`), so unmatched paths still 404.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Gate every route of `router` behind a verified bearer token.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: from_fn cannot take State, so pass it explicitly
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// Token from `Authorization`, with or without the `Bearer ` prefix. Blank counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::unauthorized("Access Denied. No Token Provided."))?
        .to_string();

    let claims = match state.identity.verify_token(&token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, path = %req.uri().path(), "access token verification failed");
            return Err(err.into());
        }
    };

    tracing::debug!(uid = %claims.uid, "request authenticated");

    // middleware -> extractor
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}
