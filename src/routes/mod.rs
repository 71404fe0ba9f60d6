//! Router Module Index
//!
//! One sub-router per resource. `api_routes` nests them all under `/api`
//! so the path prefixes below are relative to that mount point.

use crate::AppState;
use axum::Router;

pub mod articles;
pub mod comments;
pub mod topics;
pub mod users;

/// Assembles the `/api` tree from the per-resource routers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/topics", topics::topic_routes())
        .nest("/articles", articles::article_routes())
        .nest("/comments", comments::comment_routes())
        .nest("/users", users::user_routes())
}
