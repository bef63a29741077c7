//! Domain service for comments on catalog entries.

use thiserror::Error;

use crate::domain::{AnimeId, Principal, UserId};
use crate::models::Comment;

/// Longest comment body accepted, in characters.
pub const MAX_COMMENT_LENGTH: usize = 5000;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Anime not found: {0}")]
    AnimeNotFound(AnimeId),

    #[error("Comment not found: {0}")]
    NotFound(i32),

    #[error("Not allowed to modify comment {0}")]
    Unauthorized(i32),

    #[error("Invalid comment: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CommentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Trims `content` and checks it is non-empty and within [`MAX_COMMENT_LENGTH`].
pub fn normalize_content(content: &str) -> Result<&str, CommentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CommentError::InvalidInput(
            "Comment cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CommentError::InvalidInput(format!(
            "Comment must be {MAX_COMMENT_LENGTH} characters or less"
        )));
    }
    Ok(trimmed)
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    async fn list_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Comment>, CommentError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Comment>, CommentError>;

    /// Fetches a comment for editing. Only its author may read it this way.
    async fn get_own(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
    ) -> Result<Comment, CommentError>;

    /// # Errors
    ///
    /// - [`CommentError::AnimeNotFound`] if the anime does not exist
    /// - [`CommentError::InvalidInput`] if the content is blank or too long
    async fn add(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        content: &str,
    ) -> Result<Comment, CommentError>;

    /// Only the author may edit, and only under the anime it was written for.
    async fn update(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
        content: &str,
    ) -> Result<Comment, CommentError>;

    /// The author or a moderator may delete.
    async fn delete(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
    ) -> Result<(), CommentError>;
}
