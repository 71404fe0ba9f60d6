use crate::{
    error::AppError,
    models::{SortBy, SortOrder},
    repository::{Lookup, Repository},
};

/// validate_id
///
/// Parses a path segment as a resource id. Only positive integers that fit
/// the `SERIAL` column are accepted; anything else is a 400.
pub fn validate_id(raw: &str) -> Result<i32, AppError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::bad_request()),
    }
}

/// parse_sort_by
///
/// Case-insensitive whitelist lookup. Missing means `created_at`.
pub fn parse_sort_by(raw: Option<&str>) -> Result<SortBy, AppError> {
    let Some(raw) = raw else {
        return Ok(SortBy::default());
    };
    let normalized = raw.trim().to_lowercase();
    SortBy::ALL
        .into_iter()
        .find(|column| column.as_str() == normalized)
        .ok_or_else(AppError::bad_request)
}

/// parse_order
///
/// `asc` or `desc` in any case. Missing means `desc`.
pub fn parse_order(raw: Option<&str>) -> Result<SortOrder, AppError> {
    let Some(raw) = raw else {
        return Ok(SortOrder::default());
    };
    match raw.trim().to_uppercase().as_str() {
        "ASC" => Ok(SortOrder::Asc),
        "DESC" => Ok(SortOrder::Desc),
        _ => Err(AppError::bad_request()),
    }
}

/// require_text
///
/// A body field that must be present and contain something other than whitespace.
pub fn require_text(value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::bad_request()),
    }
}

/// check_exists
///
/// Asks the repository whether the named resource exists and turns a miss into
/// "<Resource> not found".
pub async fn check_exists(repo: &dyn Repository, lookup: Lookup<'_>) -> Result<(), AppError> {
    if repo.exists(lookup).await? {
        Ok(())
    } else {
        Err(AppError::not_found(lookup.resource()))
    }
}
