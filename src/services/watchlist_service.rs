//! Domain service for the per-user watchlist.

use thiserror::Error;

use crate::domain::{AnimeId, UserId};
use crate::models::Watchlist;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Anime not found: {0}")]
    AnimeNotFound(AnimeId),

    #[error("User {0} has no watchlist")]
    NotFound(UserId),

    #[error("Anime {0} is already in the watchlist")]
    AlreadyPresent(AnimeId),

    #[error("Anime {0} is not in the watchlist")]
    NotPresent(AnimeId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for WatchlistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Every operation acts on the watchlist of `user_id`, which callers take
/// from the authenticated principal.
#[async_trait::async_trait]
pub trait WatchlistService: Send + Sync {
    /// The user's watchlist. A user who never added anything gets an empty one.
    async fn get(&self, user_id: UserId) -> Result<Watchlist, WatchlistError>;

    /// # Errors
    ///
    /// - [`WatchlistError::AnimeNotFound`] if the anime does not exist
    /// - [`WatchlistError::AlreadyPresent`] if it is already in the watchlist
    async fn add(&self, user_id: UserId, anime_id: AnimeId) -> Result<Watchlist, WatchlistError>;

    /// # Errors
    ///
    /// - [`WatchlistError::AnimeNotFound`] if the anime does not exist
    /// - [`WatchlistError::NotFound`] if the user has no watchlist yet
    /// - [`WatchlistError::NotPresent`] if the anime is not in it
    async fn remove(&self, user_id: UserId, anime_id: AnimeId)
    -> Result<Watchlist, WatchlistError>;

    async fn contains(&self, user_id: UserId, anime_id: AnimeId) -> Result<bool, WatchlistError>;
}
