//! `SeaORM` implementation of the `AnimeService` trait.
//!
//! Catalog data lives in the [`Store`]; remote search, import and the trending
//! list go through the shared [`KitsuClient`].

use crate::clients::{KitsuClient, Season};
use crate::db::Store;
use crate::domain::{AnimeId, Capability, Principal};
use crate::models::{Anime, AnimeDraft};
use crate::services::anime_service::{
    AnimeError, AnimeService, TRENDING_LIMIT, TrendingAnime, upcoming_season, validate_draft,
};
use crate::services::catalog::{CatalogFilter, query_anime};

pub struct SeaOrmAnimeService {
    store: Store,
    kitsu: KitsuClient,
}

impl SeaOrmAnimeService {
    #[must_use]
    pub const fn new(store: Store, kitsu: KitsuClient) -> Self {
        Self { store, kitsu }
    }

    /// Top rated Kitsu titles of one season, each tagged with the local id of
    /// a catalog entry carrying the same title.
    async fn seasonal_list(
        &self,
        season: Season,
        year: i32,
    ) -> Result<Vec<TrendingAnime>, AnimeError> {
        let drafts = self
            .kitsu
            .seasonal(season, year, TRENDING_LIMIT)
            .await
            .map_err(|e| {
                tracing::warn!("Kitsu seasonal list for {season} {year} failed: {e:#}");
                AnimeError::kitsu_error(e.to_string())
            })?;

        let titles: Vec<String> = drafts.iter().map(|d| d.title.clone()).collect();
        let local = self.store.anime_ids_for_titles(&titles).await?;

        Ok(drafts
            .into_iter()
            .map(|anime| TrendingAnime {
                local_id: local.get(&anime.title).copied(),
                anime,
            })
            .collect())
    }

    fn require_catalog(principal: &Principal) -> Result<(), AnimeError> {
        if principal.can(Capability::ManageCatalog) {
            Ok(())
        } else {
            Err(AnimeError::Unauthorized)
        }
    }

    /// Fails with [`AnimeError::Conflict`] when `title` belongs to an entry
    /// other than `except`.
    async fn ensure_title_free(
        &self,
        title: &str,
        except: Option<AnimeId>,
    ) -> Result<(), AnimeError> {
        match self.store.get_anime_by_title(title).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(AnimeError::Conflict(title.to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn remote_search(&self, query: &str) -> Result<Vec<AnimeDraft>, AnimeError> {
        self.kitsu.search_anime(query).await.map_err(|e| {
            tracing::warn!("Kitsu search for '{query}' failed: {e:#}");
            AnimeError::kitsu_error(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl AnimeService for SeaOrmAnimeService {
    async fn query(&self, filter: &CatalogFilter) -> Result<Vec<Anime>, AnimeError> {
        let catalog = self.store.list_all_anime().await?;
        Ok(query_anime(catalog, filter))
    }

    async fn get(&self, id: AnimeId) -> Result<Anime, AnimeError> {
        self.store
            .get_anime(id)
            .await?
            .ok_or(AnimeError::NotFound(id))
    }

    async fn get_by_title(&self, title: &str) -> Result<Anime, AnimeError> {
        self.store
            .get_anime_by_title(title.trim())
            .await?
            .ok_or_else(|| AnimeError::TitleNotFound(title.to_string()))
    }

    async fn create(
        &self,
        principal: &Principal,
        mut draft: AnimeDraft,
    ) -> Result<Anime, AnimeError> {
        Self::require_catalog(principal)?;
        validate_draft(&mut draft)?;
        self.ensure_title_free(&draft.title, None).await?;

        Ok(self.store.add_anime(&draft).await?)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: AnimeId,
        mut draft: AnimeDraft,
    ) -> Result<Anime, AnimeError> {
        Self::require_catalog(principal)?;
        validate_draft(&mut draft)?;
        self.ensure_title_free(&draft.title, Some(id)).await?;

        self.store
            .update_anime(id, &draft)
            .await?
            .ok_or(AnimeError::NotFound(id))
    }

    async fn delete(&self, principal: &Principal, id: AnimeId) -> Result<(), AnimeError> {
        Self::require_catalog(principal)?;

        if !self.store.remove_anime(id).await? {
            return Err(AnimeError::NotFound(id));
        }

        tracing::info!("Anime {} deleted by {}", id, principal.username);
        Ok(())
    }

    async fn search_remote(
        &self,
        principal: &Principal,
        query: &str,
    ) -> Result<Vec<AnimeDraft>, AnimeError> {
        Self::require_catalog(principal)?;

        let query = query.trim();
        if query.is_empty() {
            return Err(AnimeError::InvalidData(
                "Search query cannot be empty".to_string(),
            ));
        }

        self.remote_search(query).await
    }

    async fn import_by_title(
        &self,
        principal: &Principal,
        title: &str,
    ) -> Result<Anime, AnimeError> {
        let candidates = self.search_remote(principal, title).await?;

        let mut draft = candidates
            .into_iter()
            .next()
            .ok_or_else(|| AnimeError::TitleNotFound(title.trim().to_string()))?;

        validate_draft(&mut draft)?;
        self.ensure_title_free(&draft.title, None).await?;

        let anime = self.store.add_anime(&draft).await?;
        tracing::info!(
            "Imported '{}' from Kitsu as anime {} (requested by {})",
            anime.title,
            anime.id,
            principal.username
        );
        Ok(anime)
    }

    async fn trending(
        &self,
        season: Option<Season>,
        year: Option<i32>,
    ) -> Result<Vec<TrendingAnime>, AnimeError> {
        let (current, current_year) = Season::containing(chrono::Utc::now().date_naive());
        self.seasonal_list(season.unwrap_or(current), year.unwrap_or(current_year))
            .await
    }

    async fn upcoming(&self) -> Result<Vec<TrendingAnime>, AnimeError> {
        let (season, year) = upcoming_season(chrono::Utc::now().date_naive());
        self.seasonal_list(season, year).await
    }
}
