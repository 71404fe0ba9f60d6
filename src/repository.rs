use crate::models::{Article, ArticleFilter, ArticleSummary, Comment, Topic, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;

/// Lookup
///
/// Names a single resource by its key for existence checks. The table and
/// column come from the variant, never from request input, so they can be
/// spliced into SQL while the key itself is always bound as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Topic(&'a str),
    Article(i32),
    Comment(i32),
    User(&'a str),
}

impl Lookup<'_> {
    pub fn table(&self) -> &'static str {
        match self {
            Lookup::Topic(_) => "topics",
            Lookup::Article(_) => "articles",
            Lookup::Comment(_) => "comments",
            Lookup::User(_) => "users",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Lookup::Topic(_) => "slug",
            Lookup::Article(_) => "article_id",
            Lookup::Comment(_) => "comment_id",
            Lookup::User(_) => "username",
        }
    }

    /// Human-readable resource name used in 404 messages.
    pub fn resource(&self) -> &'static str {
        match self {
            Lookup::Topic(_) => "Topic",
            Lookup::Article(_) => "Article",
            Lookup::Comment(_) => "Comment",
            Lookup::User(_) => "User",
        }
    }
}

/// Repository Trait
///
/// The persistence contract used by the service layer. Every method is a single
/// parameterized statement; validation and business rules live above it.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across
/// Axum's request tasks and let tests substitute an in-memory implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn exists(&self, lookup: Lookup<'_>) -> Result<bool, sqlx::Error>;

    // --- Topics ---
    async fn fetch_topics(&self) -> Result<Vec<Topic>, sqlx::Error>;

    // --- Articles ---
    async fn fetch_articles(&self, filter: &ArticleFilter)
    -> Result<Vec<ArticleSummary>, sqlx::Error>;
    async fn fetch_article_by_id(&self, article_id: i32) -> Result<Option<Article>, sqlx::Error>;
    // Returns None when no article has this id.
    async fn update_article_votes(
        &self,
        article_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Article>, sqlx::Error>;

    // --- Comments ---
    async fn fetch_article_comments(&self, article_id: i32) -> Result<Vec<Comment>, sqlx::Error>;
    async fn insert_comment(
        &self,
        article_id: i32,
        author: &str,
        body: &str,
    ) -> Result<Comment, sqlx::Error>;
    // True if a row was deleted.
    async fn remove_comment_by_id(&self, comment_id: i32) -> Result<bool, sqlx::Error>;
    async fn update_comment_votes(
        &self,
        comment_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Comment>, sqlx::Error>;

    // --- Users ---
    async fn fetch_users(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ARTICLE_COLUMNS: &str =
    "article_id, title, topic, author, body, created_at, votes, article_img_url";
const COMMENT_COLUMNS: &str = "comment_id, article_id, body, votes, author, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    /// exists
    ///
    /// `SELECT EXISTS (...)` against the table/column pair the `Lookup` names.
    async fn exists(&self, lookup: Lookup<'_>) -> Result<bool, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
        builder.push(lookup.table());
        builder.push(" WHERE ");
        builder.push(lookup.column());
        builder.push(" = ");
        match lookup {
            Lookup::Topic(key) | Lookup::User(key) => builder.push_bind(key),
            Lookup::Article(id) | Lookup::Comment(id) => builder.push_bind(id),
        };
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
    }

    async fn fetch_topics(&self) -> Result<Vec<Topic>, sqlx::Error> {
        sqlx::query_as::<_, Topic>("SELECT slug, description, img_url FROM topics ORDER BY slug")
            .fetch_all(&self.pool)
            .await
    }

    /// fetch_articles
    ///
    /// Builds the listing with QueryBuilder. The topic is bound as a parameter;
    /// the ORDER BY column and direction come from the `SortBy`/`SortOrder`
    /// enums, so only whitelisted SQL is ever pushed verbatim.
    async fn fetch_articles(
        &self,
        filter: &ArticleFilter,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                a.article_id, a.title, a.topic, a.author, a.created_at,
                a.votes, a.article_img_url,
                COUNT(c.comment_id)::INT AS comment_count
            FROM articles AS a
            LEFT JOIN comments AS c ON a.article_id = c.article_id
            "#,
        );

        if let Some(topic) = &filter.topic {
            builder.push(" WHERE a.topic = ");
            builder.push_bind(topic.clone());
        }

        builder.push(" GROUP BY a.article_id ORDER BY ");
        builder.push(filter.sort_by.sql_column());
        builder.push(" ");
        builder.push(filter.order.sql_keyword());
        // Stable order between rows sharing the sort value.
        builder.push(", a.article_id ");
        builder.push(filter.order.sql_keyword());

        builder
            .build_query_as::<ArticleSummary>()
            .fetch_all(&self.pool)
            .await
    }

    async fn fetch_article_by_id(&self, article_id: i32) -> Result<Option<Article>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = $1"
        ))
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// update_article_votes
    ///
    /// Increments in a single statement so concurrent votes are not lost.
    async fn update_article_votes(
        &self,
        article_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Article>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET votes = votes + $1 WHERE article_id = $2 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(inc_votes)
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn fetch_article_comments(&self, article_id: i32) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = $1 ORDER BY created_at DESC, comment_id DESC"
        ))
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn insert_comment(
        &self,
        article_id: i32,
        author: &str,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (article_id, author, body) VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(article_id)
        .bind(author)
        .bind(body)
        .fetch_one(&self.pool)
        .await
    }

    async fn remove_comment_by_id(&self, comment_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_comment_votes(
        &self,
        comment_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET votes = votes + $1 WHERE comment_id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(inc_votes)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT username, name, avatar_url FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT username, name, avatar_url FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }
}
