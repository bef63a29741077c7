//! Domain service for per-user ratings and their aggregates.

use thiserror::Error;

use crate::domain::{AnimeId, Principal, UserId};
use crate::models::{Anime, Rating, RatingSummary};

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Anime not found: {0}")]
    AnimeNotFound(AnimeId),

    #[error("Rating not found: {0}")]
    NotFound(i32),

    #[error("Rating {0} does not belong to this user and anime")]
    Unauthorized(i32),

    #[error("Invalid rating: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for RatingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Arithmetic mean rounded half-up to two decimals, `0.0` for no ratings.
///
/// Rounding is done on integers (`sum * 100 / count`, half-up) so values like
/// 1.665 never drift through binary floating point.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let count = i64::try_from(values.len()).unwrap_or(i64::MAX);
    let hundredths = (sum * 200 + count) / (2 * count);

    hundredths as f64 / 100.0
}

/// Anime ids of the `n` highest ratings. Ties keep the order of `ratings`.
#[must_use]
pub fn top_rated_ids(mut ratings: Vec<Rating>, n: usize) -> Vec<AnimeId> {
    ratings.sort_by(|a, b| b.value.cmp(&a.value));
    ratings.into_iter().take(n).map(|r| r.anime_id).collect()
}

#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    /// Creates the caller's rating for an anime, or overwrites the existing one.
    ///
    /// # Errors
    ///
    /// - [`RatingError::InvalidInput`] if `value` is outside `1..=5`
    /// - [`RatingError::AnimeNotFound`] if the anime does not exist
    async fn upsert_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        value: i32,
    ) -> Result<Rating, RatingError>;

    /// Mean of every rating for the anime, `0.0` when there are none.
    async fn average_for_anime(&self, anime_id: AnimeId) -> Result<f64, RatingError>;

    async fn summary_for_anime(&self, anime_id: AnimeId) -> Result<RatingSummary, RatingError>;

    async fn ratings_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Rating>, RatingError>;

    async fn rating_for_user(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> Result<Option<Rating>, RatingError>;

    /// At most `n` anime, ordered by the user's rating descending.
    async fn top_n_for_user(&self, user_id: UserId, n: usize) -> Result<Vec<Anime>, RatingError>;

    /// # Errors
    ///
    /// - [`RatingError::NotFound`] if `rating_id` is unknown
    /// - [`RatingError::Unauthorized`] if the stored anime or user differ from the supplied ones
    async fn update_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        rating_id: i32,
        value: i32,
    ) -> Result<Rating, RatingError>;

    /// Same checks as [`RatingService::update_rating`].
    async fn delete_rating(
        &self,
        principal: &Principal,
        anime_id: AnimeId,
        rating_id: i32,
    ) -> Result<(), RatingError>;
}
