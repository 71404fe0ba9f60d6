use crate::{AppState, handlers};
use axum::{Router, routing::delete};

/// Comment routes, mounted at `/api/comments`.
pub fn comment_routes() -> Router<AppState> {
    // DELETE/PATCH /api/comments/{comment_id}
    Router::new().route(
        "/{comment_id}",
        delete(handlers::delete_comment).patch(handlers::update_comment_votes),
    )
}
