use anyhow::Context;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::OnConflict,
};
use tracing::info;

use super::anime::AnimeRepository;
use crate::domain::{AnimeId, UserId};
use crate::entities::{anime, watchlist_anime, watchlists};
use crate::models::watchlist::Watchlist;

/// Result of a membership change on a user's watchlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Applied,
    /// The anime was already present (add) or already absent (remove).
    Unchanged,
    /// Only returned by remove: the user never had a watchlist.
    NoWatchlist,
}

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find_model<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
    ) -> anyhow::Result<Option<watchlists::Model>> {
        watchlists::Entity::find()
            .filter(watchlists::Column::UserId.eq(user_id.value()))
            .one(conn)
            .await
            .context("Failed to query watchlist")
    }

    pub async fn get_for_user(&self, user_id: UserId) -> anyhow::Result<Option<Watchlist>> {
        let Some(watchlist) = Self::find_model(&self.conn, user_id).await? else {
            return Ok(None);
        };

        let rows = watchlist_anime::Entity::find()
            .filter(watchlist_anime::Column::WatchlistId.eq(watchlist.id))
            .order_by_asc(watchlist_anime::Column::AddedAt)
            .find_also_related(anime::Entity)
            .all(&self.conn)
            .await
            .context("Failed to load watchlist entries")?;

        Ok(Some(Watchlist {
            id: Some(watchlist.id),
            user_id,
            created_at: Some(watchlist.created_at),
            anime: rows
                .into_iter()
                .filter_map(|(_, anime)| anime.map(AnimeRepository::map_model))
                .collect(),
        }))
    }

    /// Adds an anime, creating the watchlist on first use. The unique index on
    /// `user_id` and the composite key on the join table make both inserts
    /// idempotent under concurrent calls.
    pub async fn add(&self, user_id: UserId, anime_id: AnimeId) -> anyhow::Result<MembershipChange> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        watchlists::Entity::insert(watchlists::ActiveModel {
            user_id: Set(user_id.value()),
            created_at: Set(now.clone()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(watchlists::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .context("Failed to create watchlist")?;

        let watchlist = Self::find_model(&txn, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Watchlist for user {user_id} missing after insert"))?;

        let inserted = watchlist_anime::Entity::insert(watchlist_anime::ActiveModel {
            watchlist_id: Set(watchlist.id),
            anime_id: Set(anime_id.value()),
            added_at: Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                watchlist_anime::Column::WatchlistId,
                watchlist_anime::Column::AnimeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .context("Failed to add watchlist entry")?;

        txn.commit().await?;

        if inserted == 0 {
            return Ok(MembershipChange::Unchanged);
        }

        info!("User {} added anime {} to watchlist", user_id, anime_id);
        Ok(MembershipChange::Applied)
    }

    pub async fn remove(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> anyhow::Result<MembershipChange> {
        let Some(watchlist) = Self::find_model(&self.conn, user_id).await? else {
            return Ok(MembershipChange::NoWatchlist);
        };

        let result = watchlist_anime::Entity::delete_many()
            .filter(watchlist_anime::Column::WatchlistId.eq(watchlist.id))
            .filter(watchlist_anime::Column::AnimeId.eq(anime_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to remove watchlist entry")?;

        if result.rows_affected == 0 {
            return Ok(MembershipChange::Unchanged);
        }

        info!("User {} removed anime {} from watchlist", user_id, anime_id);
        Ok(MembershipChange::Applied)
    }

    pub async fn contains(&self, user_id: UserId, anime_id: AnimeId) -> anyhow::Result<bool> {
        let Some(watchlist) = Self::find_model(&self.conn, user_id).await? else {
            return Ok(false);
        };

        let entry = watchlist_anime::Entity::find_by_id((watchlist.id, anime_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query watchlist entry")?;

        Ok(entry.is_some())
    }
}
