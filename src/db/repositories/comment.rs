use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::domain::{AnimeId, UserId};
use crate::entities::{comments, users};
use crate::models::comment::Comment;

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: comments::Model, author: Option<users::Model>) -> Comment {
        Comment {
            id: model.id,
            anime_id: AnimeId::new(model.anime_id),
            user_id: UserId::new(model.user_id),
            username: author.map(|u| u.username).unwrap_or_default(),
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn list_for_anime(&self, anime_id: AnimeId) -> anyhow::Result<Vec<Comment>> {
        let rows = comments::Entity::find()
            .filter(comments::Column::AnimeId.eq(anime_id.value()))
            .order_by_asc(comments::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list comments for anime")?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| Self::map_model(comment, author))
            .collect())
    }

    pub async fn list_for_user(&self, user_id: UserId) -> anyhow::Result<Vec<Comment>> {
        let rows = comments::Entity::find()
            .filter(comments::Column::UserId.eq(user_id.value()))
            .order_by_desc(comments::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list comments for user")?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| Self::map_model(comment, author))
            .collect())
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<Comment>> {
        let row = comments::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query comment")?;

        Ok(row.map(|(comment, author)| Self::map_model(comment, author)))
    }

    pub async fn insert(
        &self,
        anime_id: AnimeId,
        user_id: UserId,
        content: &str,
    ) -> anyhow::Result<i32> {
        let active = comments::ActiveModel {
            anime_id: Set(anime_id.value()),
            user_id: Set(user_id.value()),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert comment")?;

        info!("User {} commented on anime {}", user_id, anime_id);
        Ok(model.id)
    }

    pub async fn update_content(&self, id: i32, content: &str) -> anyhow::Result<bool> {
        let Some(model) = comments::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment for update")?
        else {
            return Ok(false);
        };

        let mut active: comments::ActiveModel = model.into();
        active.content = Set(content.to_string());
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active
            .update(&self.conn)
            .await
            .context("Failed to update comment")?;

        Ok(true)
    }

    pub async fn remove(&self, id: i32) -> anyhow::Result<bool> {
        let result = comments::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected > 0)
    }
}
