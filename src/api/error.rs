use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AnimeError, AuthError, CommentError, RatingError, WatchlistError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    /// No principal, or credentials that do not resolve to one.
    Unauthorized(String),

    /// A principal that lacks ownership or the needed capability.
    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AnimeError> for ApiError {
    fn from(err: AnimeError) -> Self {
        match err {
            AnimeError::NotFound(id) => Self::anime_not_found(id.value()),
            AnimeError::TitleNotFound(_) => Self::NotFound(err.to_string()),
            AnimeError::Conflict(_) => Self::Conflict(err.to_string()),
            AnimeError::InvalidData(msg) => Self::ValidationError(msg),
            AnimeError::Unauthorized => Self::Forbidden(err.to_string()),
            AnimeError::Database(msg) => Self::DatabaseError(msg),
            AnimeError::ExternalApi { service, message } => {
                Self::ExternalApiError { service, message }
            }
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::AnimeNotFound(id) => Self::anime_not_found(id.value()),
            RatingError::NotFound(id) => Self::not_found("Rating", id),
            RatingError::Unauthorized(_) => Self::Forbidden(err.to_string()),
            RatingError::InvalidInput(msg) => Self::ValidationError(msg),
            RatingError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::AnimeNotFound(id) => Self::anime_not_found(id.value()),
            CommentError::NotFound(id) => Self::not_found("Comment", id),
            CommentError::Unauthorized(_) => Self::Forbidden(err.to_string()),
            CommentError::InvalidInput(msg) => Self::ValidationError(msg),
            CommentError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<WatchlistError> for ApiError {
    fn from(err: WatchlistError) -> Self {
        match err {
            WatchlistError::AnimeNotFound(id) => Self::anime_not_found(id.value()),
            WatchlistError::NotFound(_) => Self::NotFound(err.to_string()),
            WatchlistError::AlreadyPresent(_) | WatchlistError::NotPresent(_) => {
                Self::Conflict(err.to_string())
            }
            WatchlistError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::UserNotFound(id) => Self::not_found("User", id),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Conflict(_) => Self::Conflict(err.to_string()),
            AuthError::Unauthorized => Self::Forbidden("Insufficient permissions".to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn anime_not_found(id: i32) -> Self {
        Self::NotFound(format!("Anime {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
