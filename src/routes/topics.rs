use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Topic routes, mounted at `/api/topics`.
pub fn topic_routes() -> Router<AppState> {
    // GET /api/topics
    Router::new().route("/", get(handlers::get_topics))
}
