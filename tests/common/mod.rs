#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, TimeZone, Utc};
use news_api::{
    AppConfig, AppState, create_router,
    models::{Article, ArticleFilter, ArticleSummary, Comment, SortBy, SortOrder, Topic, User},
    repository::{Lookup, Repository},
};
use serde_json::Value;
use sqlx::error::{DatabaseError, ErrorKind};
use std::{
    borrow::Cow,
    cmp::Ordering,
    error::Error as StdError,
    sync::{Arc, Mutex},
};
use tower::ServiceExt;

// --- POSTGRES ERROR STAND-IN ---

/// A driver error carrying a Postgres SQLSTATE, as the real server would raise.
#[derive(Debug, thiserror::Error)]
#[error("postgres error {code}")]
pub struct PgCodeError {
    pub code: &'static str,
}

impl DatabaseError for PgCodeError {
    fn message(&self) -> &str {
        self.code
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub fn pg_error(code: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(PgCodeError { code }))
}

/// `INT` overflow, as `votes = votes + $1` raises it.
fn add_votes(votes: i32, inc_votes: i32) -> Result<i32, sqlx::Error> {
    votes.checked_add(inc_votes).ok_or_else(|| pg_error("22003"))
}

/// Postgres text cannot hold NUL.
fn text(value: &str) -> Result<&str, sqlx::Error> {
    if value.contains('\0') {
        Err(pg_error("22021"))
    } else {
        Ok(value)
    }
}

// --- IN-MEMORY REPOSITORY ---

/// Mirrors `tests/fixtures/news.sql` so handler and router tests can run
/// without a database. `last_filter` records what the service layer handed
/// to `fetch_articles`; `fail` makes every call return a driver error.
pub struct InMemoryRepository {
    pub topics: Vec<Topic>,
    pub users: Vec<User>,
    pub articles: Mutex<Vec<Article>>,
    pub comments: Mutex<Vec<Comment>>,
    pub last_filter: Mutex<Option<ArticleFilter>>,
    pub fail: bool,
}

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn topic(slug: &str, description: &str) -> Topic {
    Topic {
        slug: slug.to_string(),
        description: description.to_string(),
        img_url: Some(format!("https://images.pexels.com/{slug}.jpeg")),
    }
}

fn user(username: &str, name: &str) -> User {
    User {
        username: username.to_string(),
        name: name.to_string(),
        avatar_url: Some(format!("https://avatars.example.com/{username}.png")),
    }
}

fn article(
    article_id: i32,
    title: &str,
    topic: &str,
    author: &str,
    created_at: DateTime<Utc>,
    votes: i32,
) -> Article {
    Article {
        article_id,
        title: title.to_string(),
        topic: topic.to_string(),
        author: Some(author.to_string()),
        body: format!("Body of {title}"),
        created_at,
        votes,
        article_img_url: Some("https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg".to_string()),
    }
}

fn comment(
    comment_id: i32,
    article_id: i32,
    author: &str,
    votes: i32,
    created_at: DateTime<Utc>,
) -> Comment {
    Comment {
        comment_id,
        article_id,
        body: format!("Comment {comment_id}"),
        votes,
        author: author.to_string(),
        created_at,
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        InMemoryRepository {
            topics: vec![
                topic("mitch", "The man, the Mitch, the legend"),
                topic("cats", "Not dogs"),
                topic("paper", "what books are made of"),
            ],
            users: vec![
                user("butter_bridge", "jonny"),
                user("icellusedkars", "sam"),
                user("rogersop", "paul"),
                user("lurker", "do_nothing"),
            ],
            articles: Mutex::new(vec![
                article(1, "Living in the shadow of a great man", "mitch", "butter_bridge", ts(2020, 7, 9, 20, 11), 100),
                article(2, "Sony Vaio; or, The Laptop", "mitch", "icellusedkars", ts(2020, 10, 16, 5, 3), 0),
                article(3, "Eight pug gifs that remind me of mitch", "mitch", "icellusedkars", ts(2020, 11, 3, 9, 12), 0),
                article(4, "Student SUES Mitch!", "mitch", "rogersop", ts(2020, 5, 6, 1, 14), 0),
                article(5, "UNCOVERED: catspiracy to bring down democracy", "cats", "rogersop", ts(2020, 8, 3, 13, 14), 0),
            ]),
            comments: Mutex::new(vec![
                comment(1, 1, "butter_bridge", 16, ts(2020, 4, 6, 12, 17)),
                comment(2, 1, "butter_bridge", 14, ts(2020, 10, 31, 3, 3)),
                comment(3, 1, "icellusedkars", 100, ts(2020, 3, 1, 1, 13)),
                comment(4, 3, "icellusedkars", 0, ts(2020, 9, 19, 23, 10)),
                comment(5, 5, "butter_bridge", 0, ts(2020, 6, 9, 5, 0)),
            ]),
            last_filter: Mutex::new(None),
            fail: false,
        }
    }
}

impl InMemoryRepository {
    pub fn failing() -> Self {
        InMemoryRepository {
            fail: true,
            ..InMemoryRepository::default()
        }
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

fn compare(a: &ArticleSummary, b: &ArticleSummary, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::ArticleId => a.article_id.cmp(&b.article_id),
        SortBy::Title => a.title.cmp(&b.title),
        SortBy::Topic => a.topic.cmp(&b.topic),
        SortBy::Author => a.author.cmp(&b.author),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Votes => a.votes.cmp(&b.votes),
        SortBy::ArticleImgUrl => a.article_img_url.cmp(&b.article_img_url),
        SortBy::CommentCount => a.comment_count.cmp(&b.comment_count),
    }
    .then(a.article_id.cmp(&b.article_id))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn exists(&self, lookup: Lookup<'_>) -> Result<bool, sqlx::Error> {
        self.check()?;
        Ok(match lookup {
            Lookup::Topic(slug) => {
                let slug = text(slug)?;
                self.topics.iter().any(|t| t.slug == slug)
            }
            Lookup::User(username) => {
                let username = text(username)?;
                self.users.iter().any(|u| u.username == username)
            }
            Lookup::Article(id) => self.articles.lock().unwrap().iter().any(|a| a.article_id == id),
            Lookup::Comment(id) => self.comments.lock().unwrap().iter().any(|c| c.comment_id == id),
        })
    }

    async fn fetch_topics(&self) -> Result<Vec<Topic>, sqlx::Error> {
        self.check()?;
        Ok(self.topics.clone())
    }

    async fn fetch_articles(
        &self,
        filter: &ArticleFilter,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        self.check()?;
        *self.last_filter.lock().unwrap() = Some(filter.clone());

        let comments = self.comments.lock().unwrap();
        let mut rows: Vec<ArticleSummary> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.topic.as_ref().is_none_or(|t| &a.topic == t))
            .map(|a| ArticleSummary {
                article_id: a.article_id,
                title: a.title.clone(),
                topic: a.topic.clone(),
                author: a.author.clone(),
                created_at: a.created_at,
                votes: a.votes,
                article_img_url: a.article_img_url.clone(),
                comment_count: comments.iter().filter(|c| c.article_id == a.article_id).count() as i32,
            })
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare(a, b, filter.sort_by);
            match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(rows)
    }

    async fn fetch_article_by_id(&self, article_id: i32) -> Result<Option<Article>, sqlx::Error> {
        self.check()?;
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.article_id == article_id)
            .cloned())
    }

    async fn update_article_votes(
        &self,
        article_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Article>, sqlx::Error> {
        self.check()?;
        let mut articles = self.articles.lock().unwrap();
        match articles.iter_mut().find(|a| a.article_id == article_id) {
            Some(a) => {
                a.votes = add_votes(a.votes, inc_votes)?;
                Ok(Some(a.clone()))
            }
            None => Ok(None),
        }
    }

    async fn fetch_article_comments(&self, article_id: i32) -> Result<Vec<Comment>, sqlx::Error> {
        self.check()?;
        let mut rows: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_comment(
        &self,
        article_id: i32,
        author: &str,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        self.check()?;
        let (author, body) = (text(author)?, text(body)?);
        let mut comments = self.comments.lock().unwrap();
        let comment_id = comments.iter().map(|c| c.comment_id).max().unwrap_or(0) + 1;
        let comment = Comment {
            comment_id,
            article_id,
            body: body.to_string(),
            votes: 0,
            author: author.to_string(),
            created_at: Utc::now(),
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn remove_comment_by_id(&self, comment_id: i32) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.comment_id != comment_id);
        Ok(comments.len() < before)
    }

    async fn update_comment_votes(
        &self,
        comment_id: i32,
        inc_votes: i32,
    ) -> Result<Option<Comment>, sqlx::Error> {
        self.check()?;
        let mut comments = self.comments.lock().unwrap();
        match comments.iter_mut().find(|c| c.comment_id == comment_id) {
            Some(c) => {
                c.votes = add_votes(c.votes, inc_votes)?;
                Ok(Some(c.clone()))
            }
            None => Ok(None),
        }
    }

    async fn fetch_users(&self) -> Result<Vec<User>, sqlx::Error> {
        self.check()?;
        Ok(self.users.clone())
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        let username = text(username)?;
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}

// --- TEST UTILITIES ---

pub fn test_state(repo: InMemoryRepository) -> AppState {
    AppState {
        repo: Arc::new(repo),
        config: AppConfig::default(),
    }
}

/// Runs one request through a freshly built router sharing `state`'s
/// repository, returning the status and the parsed JSON body (`Null` when empty).
pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    send(state, Method::GET, uri, None).await
}
