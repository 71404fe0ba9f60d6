use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Resources (Mapped to Database) ---

/// Topic
///
/// A row of the `topics` table. `slug` is the primary key and the value
/// articles reference in their `topic` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Topic {
    pub slug: String,
    pub description: String,
    pub img_url: Option<String>,
}

/// User
///
/// A row of the `users` table, keyed by `username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// ArticleSummary
///
/// The list view of an article (GET /api/articles). The body is left out and
/// the number of comments is aggregated from the `comments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ArticleSummary {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    // NULL once the author's account is removed (ON DELETE SET NULL).
    pub author: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: Option<String>,
    pub comment_count: i32,
}

/// Article
///
/// A full row of the `articles` table, as returned by the single-article and
/// vote endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: Option<String>,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: Option<String>,
}

/// Comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub comment_id: i32,
    pub article_id: i32,
    pub body: String,
    pub votes: i32,
    pub author: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Article Listing ---

/// Column an article listing may be ordered by. Only these values ever reach
/// the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    #[default]
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

impl SortBy {
    pub const ALL: [SortBy; 8] = [
        SortBy::ArticleId,
        SortBy::Title,
        SortBy::Topic,
        SortBy::Author,
        SortBy::CreatedAt,
        SortBy::Votes,
        SortBy::ArticleImgUrl,
        SortBy::CommentCount,
    ];

    /// The query-string spelling of this column.
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::ArticleId => "article_id",
            SortBy::Title => "title",
            SortBy::Topic => "topic",
            SortBy::Author => "author",
            SortBy::CreatedAt => "created_at",
            SortBy::Votes => "votes",
            SortBy::ArticleImgUrl => "article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }

    /// The SQL expression used in ORDER BY. `comment_count` is the aggregate's
    /// output alias, everything else lives on the `articles` alias `a`.
    pub fn sql_column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "a.article_id",
            SortBy::Title => "a.title",
            SortBy::Topic => "a.topic",
            SortBy::Author => "a.author",
            SortBy::CreatedAt => "a.created_at",
            SortBy::Votes => "a.votes",
            SortBy::ArticleImgUrl => "a.article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// ArticleFilter
///
/// The validated form of the `GET /api/articles` query string, handed to the
/// repository once every value is known to be safe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleFilter {
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub topic: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// ArticleQuery
///
/// Raw query parameters of `GET /api/articles`. Everything stays a string until
/// the service layer checks it against the whitelist.
#[derive(Debug, Clone, Deserialize, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleQuery {
    /// Column to order by. Defaults to `created_at`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`. Defaults to `desc`.
    pub order: Option<String>,
    /// Restrict the listing to one topic slug.
    pub topic: Option<String>,
}

/// NewComment
///
/// Body of `POST /api/articles/{article_id}/comments`. Both fields are optional
/// at the serde level so a missing field becomes a 400 "Bad request" from the
/// service rather than an extractor rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewComment {
    pub username: Option<String>,
    pub body: Option<String>,
}

/// VoteUpdate
///
/// Body of the PATCH endpoints. `inc_votes` may be negative.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VoteUpdate {
    pub inc_votes: Option<i32>,
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TopicsResponse {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleResponse {
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentResponse {
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserResponse {
    pub user: User,
}

/// ErrorBody
///
/// The body of every non-2xx response: `{"msg": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub msg: String,
}
