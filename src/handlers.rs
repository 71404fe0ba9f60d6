use crate::{
    AppState,
    error::AppError,
    models::{
        ArticleQuery, ArticleResponse, ArticlesResponse, CommentResponse, CommentsResponse,
        ErrorBody, NewComment, TopicsResponse, UserResponse, UsersResponse, VoteUpdate,
    },
    services,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

fn rejected(rejection: impl std::fmt::Display) -> AppError {
    tracing::debug!(%rejection, "rejected request");
    AppError::bad_request()
}

/// Unwraps a JSON body, turning any extractor rejection (malformed JSON, wrong
/// field types, missing content type) into the standard 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(rejected)
}

/// Same for a single path segment that is not valid UTF-8 once decoded.
fn path_param(param: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    param.map(|Path(value)| value).map_err(rejected)
}

/// Same for query strings axum cannot deserialize, e.g. a repeated key.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query.map(|Query(value)| value).map_err(rejected)
}

// --- Topics ---

/// get_topics
///
/// Lists every topic.
#[utoipa::path(
    get,
    path = "/api/topics",
    responses((status = 200, description = "All topics", body = TopicsResponse))
)]
pub async fn get_topics(State(state): State<AppState>) -> Result<Json<TopicsResponse>, AppError> {
    let topics = services::get_topics(state.repo.as_ref()).await?;
    Ok(Json(TopicsResponse { topics }))
}

// --- Articles ---

/// get_articles
///
/// Lists articles with their comment counts. `sort_by` and `order` are checked
/// against a fixed whitelist; `topic` must name an existing topic.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleQuery),
    responses(
        (status = 200, description = "Articles, newest first by default", body = ArticlesResponse),
        (status = 400, description = "sort_by or order not allowed", body = ErrorBody),
        (status = 404, description = "Topic not found", body = ErrorBody)
    )
)]
pub async fn get_articles(
    State(state): State<AppState>,
    query: Result<Query<ArticleQuery>, QueryRejection>,
) -> Result<Json<ArticlesResponse>, AppError> {
    let query = query_params(query)?;
    let articles = services::get_articles(state.repo.as_ref(), query).await?;
    Ok(Json(ArticlesResponse { articles }))
}

#[utoipa::path(
    get,
    path = "/api/articles/{article_id}",
    params(("article_id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ArticleResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Article not found", body = ErrorBody)
    )
)]
pub async fn get_article_by_id(
    State(state): State<AppState>,
    article_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ArticleResponse>, AppError> {
    let article_id = path_param(article_id)?;
    let article = services::get_article_by_id(state.repo.as_ref(), &article_id).await?;
    Ok(Json(ArticleResponse { article }))
}

/// update_article_votes
///
/// Adds `inc_votes` (possibly negative) to the article's vote count.
#[utoipa::path(
    patch,
    path = "/api/articles/{article_id}",
    params(("article_id" = i32, Path, description = "Article ID")),
    request_body = VoteUpdate,
    responses(
        (status = 200, description = "Updated", body = ArticleResponse),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 404, description = "Article not found", body = ErrorBody)
    )
)]
pub async fn update_article_votes(
    State(state): State<AppState>,
    article_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<VoteUpdate>, JsonRejection>,
) -> Result<Json<ArticleResponse>, AppError> {
    let article_id = path_param(article_id)?;
    let VoteUpdate { inc_votes } = json_body(payload)?;
    let article =
        services::update_article_votes(state.repo.as_ref(), &article_id, inc_votes).await?;
    Ok(Json(ArticleResponse { article }))
}

#[utoipa::path(
    get,
    path = "/api/articles/{article_id}/comments",
    params(("article_id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Comments, newest first", body = CommentsResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Article not found", body = ErrorBody)
    )
)]
pub async fn get_article_comments(
    State(state): State<AppState>,
    article_id: Result<Path<String>, PathRejection>,
) -> Result<Json<CommentsResponse>, AppError> {
    let article_id = path_param(article_id)?;
    let comments = services::get_article_comments(state.repo.as_ref(), &article_id).await?;
    Ok(Json(CommentsResponse { comments }))
}

/// post_comment
///
/// Creates a comment on an article as an existing user.
#[utoipa::path(
    post,
    path = "/api/articles/{article_id}/comments",
    params(("article_id" = i32, Path, description = "Article ID")),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Malformed id or missing username/body", body = ErrorBody),
        (status = 404, description = "Article or user not found", body = ErrorBody)
    )
)]
pub async fn post_comment(
    State(state): State<AppState>,
    article_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let article_id = path_param(article_id)?;
    let NewComment { username, body } = json_body(payload)?;
    let comment =
        services::post_comment(state.repo.as_ref(), &article_id, username, body).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

// --- Comments ---

#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    params(("comment_id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody)
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    comment_id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let comment_id = path_param(comment_id)?;
    services::delete_comment(state.repo.as_ref(), &comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/comments/{comment_id}",
    params(("comment_id" = i32, Path, description = "Comment ID")),
    request_body = VoteUpdate,
    responses(
        (status = 200, description = "Updated", body = CommentResponse),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody)
    )
)]
pub async fn update_comment_votes(
    State(state): State<AppState>,
    comment_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<VoteUpdate>, JsonRejection>,
) -> Result<Json<CommentResponse>, AppError> {
    let comment_id = path_param(comment_id)?;
    let VoteUpdate { inc_votes } = json_body(payload)?;
    let comment =
        services::update_comment_votes(state.repo.as_ref(), &comment_id, inc_votes).await?;
    Ok(Json(CommentResponse { comment }))
}

// --- Users ---

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users", body = UsersResponse))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, AppError> {
    let users = services::get_users(state.repo.as_ref()).await?;
    Ok(Json(UsersResponse { users }))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let username = path_param(username)?;
    let user = services::get_user_by_username(state.repo.as_ref(), &username).await?;
    Ok(Json(UserResponse { user }))
}
