use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// User routes, mounted at `/api/users`.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_users))
        .route("/{username}", get(handlers::get_user_by_username))
}
