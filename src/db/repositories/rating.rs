use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};
use tracing::info;

use crate::domain::{AnimeId, RatingValue, UserId, user_anime_key};
use crate::entities::ratings;
use crate::models::rating::Rating;

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: ratings::Model) -> Rating {
        Rating {
            id: model.id,
            user_id: UserId::new(model.user_id),
            anime_id: AnimeId::new(model.anime_id),
            value: model.value,
            user_anime_key: model.user_anime_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Inserts or overwrites the caller's rating for an anime in one statement.
    /// An existing row keeps its id and creation time.
    pub async fn upsert(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        value: RatingValue,
    ) -> anyhow::Result<Rating> {
        let key = user_anime_key(user_id, anime_id);
        let now = chrono::Utc::now().to_rfc3339();

        let active = ratings::ActiveModel {
            user_id: Set(user_id.value()),
            anime_id: Set(anime_id.value()),
            value: Set(i32::from(value)),
            user_anime_key: Set(key.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        ratings::Entity::insert(active)
            .on_conflict(
                OnConflict::column(ratings::Column::UserAnimeKey)
                    .update_columns([ratings::Column::Value, ratings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert rating")?;

        info!("User {} rated anime {} with {}", user_id, anime_id, value.value());

        self.get_by_key(&key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Rating {key} missing after upsert"))
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<Rating>> {
        let row = ratings::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query rating")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn get_by_key(&self, key: &str) -> anyhow::Result<Option<Rating>> {
        let row = ratings::Entity::find()
            .filter(ratings::Column::UserAnimeKey.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to query rating by key")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn list_for_anime(&self, anime_id: AnimeId) -> anyhow::Result<Vec<Rating>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::AnimeId.eq(anime_id.value()))
            .order_by_asc(ratings::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list ratings for anime")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// The user's ratings in storage order (ascending id).
    pub async fn list_for_user(&self, user_id: UserId) -> anyhow::Result<Vec<Rating>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id.value()))
            .order_by_asc(ratings::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list ratings for user")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn values_for_anime(&self, anime_id: AnimeId) -> anyhow::Result<Vec<i32>> {
        ratings::Entity::find()
            .select_only()
            .column(ratings::Column::Value)
            .filter(ratings::Column::AnimeId.eq(anime_id.value()))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
            .context("Failed to load rating values")
    }

    pub async fn update_value(&self, id: i32, value: RatingValue) -> anyhow::Result<Option<Rating>> {
        let Some(model) = ratings::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query rating for update")?
        else {
            return Ok(None);
        };

        let mut active: ratings::ActiveModel = model.into();
        active.value = Set(i32::from(value));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update rating")?;

        Ok(Some(Self::map_model(model)))
    }

    pub async fn remove(&self, id: i32) -> anyhow::Result<bool> {
        let result = ratings::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete rating")?;

        Ok(result.rows_affected > 0)
    }
}
