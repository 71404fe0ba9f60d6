use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Article Router Module
///
/// Mounted at `/api/articles`. Ids arrive as raw strings; the service layer
/// decides whether they are well formed.
pub fn article_routes() -> Router<AppState> {
    Router::new()
        // GET /api/articles?sort_by=&order=&topic=
        .route("/", get(handlers::get_articles))
        // GET/PATCH /api/articles/{article_id}
        .route(
            "/{article_id}",
            get(handlers::get_article_by_id).patch(handlers::update_article_votes),
        )
        // GET/POST /api/articles/{article_id}/comments
        .route(
            "/{article_id}/comments",
            get(handlers::get_article_comments).post(handlers::post_comment),
        )
}
