//! Orchestration between the handlers and the repository: every function
//! validates its raw inputs, checks that referenced resources exist and only
//! then touches storage.

use crate::{
    error::AppError,
    models::{Article, ArticleFilter, ArticleQuery, ArticleSummary, Comment, Topic, User},
    repository::{Lookup, Repository},
    validators::{check_exists, parse_order, parse_sort_by, require_text, validate_id},
};

// --- Topics ---

pub async fn get_topics(repo: &dyn Repository) -> Result<Vec<Topic>, AppError> {
    Ok(repo.fetch_topics().await?)
}

// --- Articles ---

/// get_articles
///
/// Whitelists `sort_by`/`order` before anything else so an invalid column is a
/// 400 even when the topic is unknown. An empty `topic` is treated as absent.
pub async fn get_articles(
    repo: &dyn Repository,
    query: ArticleQuery,
) -> Result<Vec<ArticleSummary>, AppError> {
    let sort_by = parse_sort_by(query.sort_by.as_deref())?;
    let order = parse_order(query.order.as_deref())?;
    let topic = query.topic.filter(|t| !t.is_empty());

    if let Some(slug) = topic.as_deref() {
        check_exists(repo, Lookup::Topic(slug)).await?;
    }

    let filter = ArticleFilter {
        sort_by,
        order,
        topic,
    };
    Ok(repo.fetch_articles(&filter).await?)
}

pub async fn get_article_by_id(repo: &dyn Repository, article_id: &str) -> Result<Article, AppError> {
    let article_id = validate_id(article_id)?;

    repo.fetch_article_by_id(article_id)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))
}

pub async fn get_article_comments(
    repo: &dyn Repository,
    article_id: &str,
) -> Result<Vec<Comment>, AppError> {
    let article_id = validate_id(article_id)?;
    check_exists(repo, Lookup::Article(article_id)).await?;

    Ok(repo.fetch_article_comments(article_id).await?)
}

/// update_article_votes
///
/// A missing `inc_votes` is a 400; the article's absence is discovered by the
/// UPDATE itself returning no row.
pub async fn update_article_votes(
    repo: &dyn Repository,
    article_id: &str,
    inc_votes: Option<i32>,
) -> Result<Article, AppError> {
    let article_id = validate_id(article_id)?;
    let inc_votes = inc_votes.ok_or_else(AppError::bad_request)?;

    repo.update_article_votes(article_id, inc_votes)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))
}

// --- Comments ---

/// post_comment
///
/// Order of checks: id shape, body fields, article, then author. The author
/// is checked explicitly so an unknown username is "User not found" rather
/// than a foreign-key failure.
pub async fn post_comment(
    repo: &dyn Repository,
    article_id: &str,
    username: Option<String>,
    body: Option<String>,
) -> Result<Comment, AppError> {
    let article_id = validate_id(article_id)?;
    let username = require_text(username)?;
    let body = require_text(body)?;

    check_exists(repo, Lookup::Article(article_id)).await?;
    check_exists(repo, Lookup::User(&username)).await?;

    let comment = repo.insert_comment(article_id, &username, &body).await?;
    tracing::info!(
        comment_id = comment.comment_id,
        article_id,
        author = %comment.author,
        "comment posted"
    );
    Ok(comment)
}

pub async fn delete_comment(repo: &dyn Repository, comment_id: &str) -> Result<(), AppError> {
    let comment_id = validate_id(comment_id)?;
    check_exists(repo, Lookup::Comment(comment_id)).await?;

    // A concurrent delete may win between the check and this statement.
    if !repo.remove_comment_by_id(comment_id).await? {
        return Err(AppError::not_found("Comment"));
    }
    tracing::info!(comment_id, "comment deleted");
    Ok(())
}

pub async fn update_comment_votes(
    repo: &dyn Repository,
    comment_id: &str,
    inc_votes: Option<i32>,
) -> Result<Comment, AppError> {
    let comment_id = validate_id(comment_id)?;
    let inc_votes = inc_votes.ok_or_else(AppError::bad_request)?;

    repo.update_comment_votes(comment_id, inc_votes)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))
}

// --- Users ---

pub async fn get_users(repo: &dyn Repository) -> Result<Vec<User>, AppError> {
    Ok(repo.fetch_users().await?)
}

pub async fn get_user_by_username(repo: &dyn Repository, username: &str) -> Result<User, AppError> {
    repo.fetch_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}
