//! `SeaORM` implementation of the `WatchlistService` trait.

use crate::db::{MembershipChange, Store};
use crate::domain::{AnimeId, UserId};
use crate::models::Watchlist;
use crate::services::watchlist_service::{WatchlistError, WatchlistService};

pub struct SeaOrmWatchlistService {
    store: Store,
}

impl SeaOrmWatchlistService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn load(&self, user_id: UserId) -> Result<Watchlist, WatchlistError> {
        Ok(self
            .store
            .get_watchlist(user_id)
            .await?
            .unwrap_or_else(|| Watchlist::empty(user_id)))
    }
}

#[async_trait::async_trait]
impl WatchlistService for SeaOrmWatchlistService {
    async fn get(&self, user_id: UserId) -> Result<Watchlist, WatchlistError> {
        self.load(user_id).await
    }

    async fn add(&self, user_id: UserId, anime_id: AnimeId) -> Result<Watchlist, WatchlistError> {
        if self.store.get_anime(anime_id).await?.is_none() {
            return Err(WatchlistError::AnimeNotFound(anime_id));
        }

        match self.store.add_to_watchlist(user_id, anime_id).await? {
            MembershipChange::Applied => {}
            MembershipChange::Unchanged | MembershipChange::NoWatchlist => {
                return Err(WatchlistError::AlreadyPresent(anime_id));
            }
        }

        self.load(user_id).await
    }

    async fn remove(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> Result<Watchlist, WatchlistError> {
        if self.store.get_anime(anime_id).await?.is_none() {
            return Err(WatchlistError::AnimeNotFound(anime_id));
        }

        match self.store.remove_from_watchlist(user_id, anime_id).await? {
            MembershipChange::Applied => self.load(user_id).await,
            MembershipChange::Unchanged => Err(WatchlistError::NotPresent(anime_id)),
            MembershipChange::NoWatchlist => Err(WatchlistError::NotFound(user_id)),
        }
    }

    async fn contains(&self, user_id: UserId, anime_id: AnimeId) -> Result<bool, WatchlistError> {
        Ok(self.store.watchlist_contains(user_id, anime_id).await?)
    }
}
