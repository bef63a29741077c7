//! `SeaORM` implementation of the `CommentService` trait.

use crate::db::Store;
use crate::domain::{AnimeId, Capability, Principal, UserId};
use crate::models::Comment;
use crate::services::comment_service::{CommentError, CommentService, normalize_content};

pub struct SeaOrmCommentService {
    store: Store,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_anime(&self, anime_id: AnimeId) -> Result<(), CommentError> {
        self.store
            .get_anime(anime_id)
            .await?
            .map(|_| ())
            .ok_or(CommentError::AnimeNotFound(anime_id))
    }

    /// Loads a comment and checks it was written for `anime_id`.
    async fn comment_under(
        &self,
        anime_id: AnimeId,
        comment_id: i32,
    ) -> Result<Comment, CommentError> {
        let comment = self
            .store
            .get_comment(comment_id)
            .await?
            .ok_or(CommentError::NotFound(comment_id))?;

        if comment.anime_id != anime_id {
            return Err(CommentError::Unauthorized(comment_id));
        }

        Ok(comment)
    }
}

#[async_trait::async_trait]
impl CommentService for SeaOrmCommentService {
    async fn list_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Comment>, CommentError> {
        self.ensure_anime(anime_id).await?;
        Ok(self.store.list_comments_for_anime(anime_id).await?)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Comment>, CommentError> {
        Ok(self.store.list_comments_for_user(user_id).await?)
    }

    async fn get_own(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
    ) -> Result<Comment, CommentError> {
        let comment = self.comment_under(anime_id, comment_id).await?;
        if comment.user_id != principal.user_id {
            return Err(CommentError::Unauthorized(comment_id));
        }
        Ok(comment)
    }

    async fn add(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let content = normalize_content(content)?;
        self.ensure_anime(anime_id).await?;

        let id = self
            .store
            .add_comment(anime_id, principal.user_id, content)
            .await?;

        self.store
            .get_comment(id)
            .await?
            .ok_or(CommentError::NotFound(id))
    }

    async fn update(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
        content: &str,
    ) -> Result<Comment, CommentError> {
        self.get_own(principal, anime_id, comment_id).await?;
        let content = normalize_content(content)?;

        if !self.store.update_comment(comment_id, content).await? {
            return Err(CommentError::NotFound(comment_id));
        }

        self.store
            .get_comment(comment_id)
            .await?
            .ok_or(CommentError::NotFound(comment_id))
    }

    async fn delete(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        comment_id: i32,
    ) -> Result<(), CommentError> {
        let comment = self.comment_under(anime_id, comment_id).await?;

        if !principal.owns_or_can(comment.user_id, Capability::ModerateComments) {
            return Err(CommentError::Unauthorized(comment_id));
        }

        if !self.store.remove_comment(comment_id).await? {
            return Err(CommentError::NotFound(comment_id));
        }

        tracing::info!(
            "Comment {} on anime {} deleted by {}",
            comment_id,
            anime_id,
            principal.username
        );
        Ok(())
    }
}
