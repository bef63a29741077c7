use crate::domain::AnimeId;
use crate::entities::{anime, comments, ratings, watchlist_anime};
use crate::models::anime::{Anime, AnimeDraft};
use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub(crate) fn map_model(model: anime::Model) -> Anime {
        Anime {
            id: AnimeId::new(model.id),
            title: model.title,
            synopsis: model.synopsis,
            image: model.image,
            start_date: model.start_date,
            end_date: model.end_date,
            episode_count: model.episode_count,
            episode_length: model.episode_length,
            subtype: model.subtype,
            status: model.status,
            age_rating_guide: model.age_rating_guide,
            created_at: model.created_at,
        }
    }

    fn apply_draft(active: &mut anime::ActiveModel, draft: &AnimeDraft) {
        active.title = Set(draft.title.clone());
        active.synopsis = Set(draft.synopsis.clone());
        active.image = Set(draft.image.clone());
        active.start_date = Set(draft.start_date);
        active.end_date = Set(draft.end_date);
        active.episode_count = Set(draft.episode_count);
        active.episode_length = Set(draft.episode_length);
        active.subtype = Set(draft.subtype.clone());
        active.status = Set(draft.status.clone());
        active.age_rating_guide = Set(draft.age_rating_guide.clone());
    }

    /// Whole catalog in storage order.
    pub async fn list(&self) -> anyhow::Result<Vec<Anime>> {
        let rows = anime::Entity::find()
            .order_by_asc(anime::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list catalog")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: AnimeId) -> anyhow::Result<Option<Anime>> {
        let row = anime::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query anime by id")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn get_many(&self, ids: &[AnimeId]) -> anyhow::Result<Vec<Anime>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(AnimeId::value).collect();
        let rows = anime::Entity::find()
            .filter(anime::Column::Id.is_in(raw))
            .all(&self.conn)
            .await
            .context("Failed to query anime batch")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Exact, case-sensitive title lookup.
    pub async fn get_by_title(&self, title: &str) -> anyhow::Result<Option<Anime>> {
        let row = anime::Entity::find()
            .filter(anime::Column::Title.eq(title))
            .one(&self.conn)
            .await
            .context("Failed to query anime by title")?;

        Ok(row.map(Self::map_model))
    }

    /// Maps each title that exists in the catalog to its id.
    pub async fn ids_for_titles(&self, titles: &[String]) -> anyhow::Result<HashMap<String, AnimeId>> {
        if titles.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = anime::Entity::find()
            .filter(anime::Column::Title.is_in(titles.iter().cloned()))
            .all(&self.conn)
            .await
            .context("Failed to query anime by titles")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.title, AnimeId::new(row.id)))
            .collect())
    }

    pub async fn insert(&self, draft: &AnimeDraft) -> anyhow::Result<Anime> {
        let mut active = anime::ActiveModel {
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Self::apply_draft(&mut active, draft);

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert anime")?;

        info!("Added anime to catalog: {}", model.title);
        Ok(Self::map_model(model))
    }

    pub async fn update(&self, id: AnimeId, draft: &AnimeDraft) -> anyhow::Result<Option<Anime>> {
        let Some(model) = anime::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query anime for update")?
        else {
            return Ok(None);
        };

        let mut active: anime::ActiveModel = model.into();
        Self::apply_draft(&mut active, draft);
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update anime")?;

        info!("Updated anime {}: {}", id, model.title);
        Ok(Some(Self::map_model(model)))
    }

    /// Deletes an anime together with every comment, rating and watchlist
    /// membership that references it.
    pub async fn remove(&self, id: AnimeId) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await?;

        watchlist_anime::Entity::delete_many()
            .filter(watchlist_anime::Column::AnimeId.eq(id.value()))
            .exec(&txn)
            .await?;

        ratings::Entity::delete_many()
            .filter(ratings::Column::AnimeId.eq(id.value()))
            .exec(&txn)
            .await?;

        comments::Entity::delete_many()
            .filter(comments::Column::AnimeId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = anime::Entity::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed anime with ID: {}", id);
        }
        Ok(removed)
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        use sea_orm::PaginatorTrait;

        anime::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count anime")
    }
}
