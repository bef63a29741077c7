use super::ApiError;
use crate::clients::Season;
use crate::domain::{AnimeId, SortBy, UserId};

pub const DEFAULT_TOP_RATED: usize = 5;

pub fn validate_anime_id(id: i32) -> Result<AnimeId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid anime ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(AnimeId::new(id))
}

pub fn validate_user_id(id: i32) -> Result<UserId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(UserId::new(id))
}

/// Ids of comments and ratings.
pub fn validate_record_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Size of a top-rated list, [`DEFAULT_TOP_RATED`] when absent.
pub fn validate_limit(limit: Option<usize>) -> Result<usize, ApiError> {
    const MAX_LIMIT: usize = 50;
    const MIN_LIMIT: usize = 1;

    let limit = limit.unwrap_or(DEFAULT_TOP_RATED);
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}

/// Blank means unsorted.
pub fn parse_sort_by(raw: Option<&str>) -> Result<Option<SortBy>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::validation),
    }
}

pub fn parse_season(raw: Option<&str>) -> Result<Option<Season>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::validation),
    }
}
