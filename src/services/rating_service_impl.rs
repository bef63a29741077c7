//! `SeaORM` implementation of the `RatingService` trait.

use std::collections::HashMap;

use crate::db::Store;
use crate::domain::{AnimeId, Principal, RatingValue, UserId, user_anime_key};
use crate::models::{Anime, Rating, RatingSummary};
use crate::services::rating_service::{
    RatingError, RatingService, average_rating, top_rated_ids,
};

pub struct SeaOrmRatingService {
    store: Store,
}

impl SeaOrmRatingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn parse_value(value: i32) -> Result<RatingValue, RatingError> {
        RatingValue::new(value).ok_or_else(|| {
            RatingError::InvalidInput(format!(
                "Rating must be between {} and {}, got {value}",
                RatingValue::MIN,
                RatingValue::MAX
            ))
        })
    }

    async fn ensure_anime(&self, anime_id: AnimeId) -> Result<(), RatingError> {
        self.store
            .get_anime(anime_id)
            .await?
            .map(|_| ())
            .ok_or(RatingError::AnimeNotFound(anime_id))
    }

    /// Loads a rating and checks that it belongs to `user_id` and `anime_id`.
    async fn owned_rating(
        &self,
        rating_id: i32,
        anime_id: AnimeId,
        user_id: UserId,
    ) -> Result<Rating, RatingError> {
        let rating = self
            .store
            .get_rating(rating_id)
            .await?
            .ok_or(RatingError::NotFound(rating_id))?;

        if rating.anime_id != anime_id || rating.user_id != user_id {
            return Err(RatingError::Unauthorized(rating_id));
        }

        Ok(rating)
    }
}

#[async_trait::async_trait]
impl RatingService for SeaOrmRatingService {
    async fn upsert_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        value: i32,
    ) -> Result<Rating, RatingError> {
        let value = Self::parse_value(value)?;
        self.ensure_anime(anime_id).await?;

        Ok(self
            .store
            .upsert_rating(principal.user_id, anime_id, value)
            .await?)
    }

    async fn average_for_anime(&self, anime_id: AnimeId) -> Result<f64, RatingError> {
        let values = self.store.rating_values_for_anime(anime_id).await?;
        Ok(average_rating(&values))
    }

    async fn summary_for_anime(&self, anime_id: AnimeId) -> Result<RatingSummary, RatingError> {
        self.ensure_anime(anime_id).await?;
        let values = self.store.rating_values_for_anime(anime_id).await?;

        Ok(RatingSummary {
            anime_id,
            average: average_rating(&values),
            count: values.len(),
        })
    }

    async fn ratings_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Rating>, RatingError> {
        self.ensure_anime(anime_id).await?;
        Ok(self.store.list_ratings_for_anime(anime_id).await?)
    }

    async fn rating_for_user(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> Result<Option<Rating>, RatingError> {
        Ok(self
            .store
            .get_rating_by_key(&user_anime_key(user_id, anime_id))
            .await?)
    }

    async fn top_n_for_user(&self, user_id: UserId, n: usize) -> Result<Vec<Anime>, RatingError> {
        let ratings = self.store.list_ratings_for_user(user_id).await?;
        let ids = top_rated_ids(ratings, n);

        let mut by_id: HashMap<AnimeId, Anime> = self
            .store
            .get_animes_by_ids(&ids)
            .await?
            .into_iter()
            .map(|anime| (anime.id, anime))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        rating_id: i32,
        value: i32,
    ) -> Result<Rating, RatingError> {
        self.owned_rating(rating_id, anime_id, principal.user_id)
            .await?;
        let value = Self::parse_value(value)?;

        self.store
            .update_rating_value(rating_id, value)
            .await?
            .ok_or(RatingError::NotFound(rating_id))
    }

    async fn delete_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        rating_id: i32,
    ) -> Result<(), RatingError> {
        self.owned_rating(rating_id, anime_id, principal.user_id)
            .await?;

        if !self.store.remove_rating(rating_id).await? {
            return Err(RatingError::NotFound(rating_id));
        }

        tracing::info!("User {} deleted rating {}", principal.user_id, rating_id);
        Ok(())
    }
}
