/*
 * Responsibility
 * - URL layout under /api
 * - Bearer is applied with route_layer to the protected sub-router only, then merged
 *   (static /user/profile wins over /user/{uid})
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::{login, profile, register, verify_token},
    health::health,
    itineraries::{add_itinerary, list_itineraries},
    users::{delete_user, get_own_profile, get_user, list_users, update_own_profile, update_user},
};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/profile", get(profile))
        .route("/user/profile", get(get_own_profile).put(update_own_profile));
    let protected = access::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .route("/auth/verify-token", post(verify_token))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/user", get(list_users))
        .route(
            "/user/{uid}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/itinerary/add", post(add_itinerary))
        .route("/itinerary/all", get(list_itineraries))
        .merge(protected)
}
