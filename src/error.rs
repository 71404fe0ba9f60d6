use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorBody;

/// Message carried by every 400 produced by validation.
pub const BAD_REQUEST: &str = "Bad request";

/// AppError
///
/// The single error type flowing out of validators, services and handlers.
/// It is converted into an HTTP response exactly once, by the `IntoResponse`
/// implementation below, so handlers simply propagate with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed identifier, non-whitelisted sort/order value or invalid body (400).
    #[error("{0}")]
    BadRequest(String),
    /// The referenced resource does not exist (404).
    #[error("{0}")]
    NotFound(String),
    /// Anything raised by the database driver. Mapped to 500 unless the
    /// Postgres error code identifies a client fault.
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn bad_request() -> Self {
        AppError::BadRequest(BAD_REQUEST.to_string())
    }

    /// Builds "<Resource> not found", e.g. "Article not found".
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{resource} not found"))
    }

    /// Status code and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Database(e) => match pg_error_code(e).as_deref() {
                // numeric_value_out_of_range, character_not_in_repertoire,
                // invalid_text_representation, not_null_violation, check_violation
                Some("22003" | "22021" | "22P02" | "23502" | "23514") => {
                    (StatusCode::BAD_REQUEST, BAD_REQUEST.to_string())
                }
                // foreign_key_violation
                Some("23503") => (StatusCode::NOT_FOUND, "Not found".to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                ),
            },
        }
    }
}

fn pg_error_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(%status, %msg, "request rejected");
        }
        (status, Json(ErrorBody { msg })).into_response()
    }
}

/// Fallback for any path the router does not know, and for known paths
/// called with a method they do not serve.
pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            msg: "Route not found".to_string(),
        }),
    )
        .into_response()
}

/// Used by `CatchPanicLayer` so a panicking handler still answers with the
/// standard `{msg}` body instead of dropping the connection.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            msg: "Internal Server Error".to_string(),
        }),
    )
        .into_response()
}

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment is incomplete or malformed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}
