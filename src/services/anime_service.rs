//! Domain service for the local catalog and Kitsu import.
//!
//! Reads are public. Every write and every outbound Kitsu search requires the
//! [`Capability::ManageCatalog`](crate::domain::Capability::ManageCatalog)
//! capability of the calling [`Principal`].

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::clients::Season;
use crate::domain::{AnimeId, Principal};
use crate::models::{Anime, AnimeDraft};
use crate::services::catalog::CatalogFilter;

/// Number of entries in the trending list.
pub const TRENDING_LIMIT: u32 = 9;

#[derive(Debug, Error)]
pub enum AnimeError {
    #[error("Anime not found: {0}")]
    NotFound(AnimeId),

    #[error("No anime titled '{0}'")]
    TitleNotFound(String),

    #[error("An anime titled '{0}' already exists")]
    Conflict(String),

    #[error("Invalid anime data: {0}")]
    InvalidData(String),

    #[error("Not allowed to manage the catalog")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("External API error: {service} - {message}")]
    ExternalApi { service: String, message: String },
}

impl AnimeError {
    pub fn kitsu_error(msg: impl Into<String>) -> Self {
        Self::ExternalApi {
            service: "Kitsu".to_string(),
            message: msg.into(),
        }
    }
}

impl From<anyhow::Error> for AnimeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A Kitsu seasonal entry, linked to the catalog when a local anime has the
/// same title.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingAnime {
    #[serde(flatten)]
    pub anime: AnimeDraft,
    pub local_id: Option<AnimeId>,
}

/// Checks a draft before it is written. Titles are trimmed in place.
pub fn validate_draft(draft: &mut AnimeDraft) -> Result<(), AnimeError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(AnimeError::InvalidData("Title cannot be empty".to_string()));
    }
    if title.len() != draft.title.len() {
        draft.title = title.to_string();
    }

    for (name, value) in [
        ("episode_count", draft.episode_count),
        ("episode_length", draft.episode_length),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(AnimeError::InvalidData(format!("{name} cannot be negative")));
        }
    }

    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date)
        && end < start
    {
        return Err(AnimeError::InvalidData(
            "end_date cannot be before start_date".to_string(),
        ));
    }

    Ok(())
}

#[async_trait::async_trait]
pub trait AnimeService: Send + Sync {
    /// Filters and sorts the whole catalog.
    async fn query(&self, filter: &CatalogFilter) -> Result<Vec<Anime>, AnimeError>;

    /// # Errors
    ///
    /// Returns [`AnimeError::NotFound`] if the anime does not exist.
    async fn get(&self, id: AnimeId) -> Result<Anime, AnimeError>;

    /// Exact title lookup.
    async fn get_by_title(&self, title: &str) -> Result<Anime, AnimeError>;

    /// # Errors
    ///
    /// - [`AnimeError::Unauthorized`] without the catalog capability
    /// - [`AnimeError::Conflict`] if the title is taken
    async fn create(&self, principal: &Principal, draft: AnimeDraft)
    -> Result<Anime, AnimeError>;

    /// Replaces every field of an existing entry.
    async fn update(
        &self,
        principal: &Principal,
        id: AnimeId,
        draft: AnimeDraft,
    ) -> Result<Anime, AnimeError>;

    /// Deletes an entry together with its comments, ratings and watchlist
    /// memberships.
    async fn delete(&self, principal: &Principal, id: AnimeId) -> Result<(), AnimeError>;

    /// Kitsu candidates for `query`, mapped one to one.
    async fn search_remote(
        &self,
        principal: &Principal,
        query: &str,
    ) -> Result<Vec<AnimeDraft>, AnimeError>;

    /// Imports the first Kitsu candidate for `title`.
    ///
    /// # Errors
    ///
    /// - [`AnimeError::TitleNotFound`] if Kitsu has no candidate
    /// - [`AnimeError::Conflict`] if the catalog already has that title
    async fn import_by_title(
        &self,
        principal: &Principal,
        title: &str,
    ) -> Result<Anime, AnimeError>;

    /// Highest rated titles of a season, current season when `season` is `None`.
    async fn trending(
        &self,
        season: Option<Season>,
        year: Option<i32>,
    ) -> Result<Vec<TrendingAnime>, AnimeError>;

    /// Same list as [`AnimeService::trending`] for the season after today's.
    async fn upcoming(&self) -> Result<Vec<TrendingAnime>, AnimeError>;
}

/// Season and year following the one that contains `today`.
#[must_use]
pub fn upcoming_season(today: NaiveDate) -> (Season, i32) {
    let (season, year) = Season::containing(today);
    season.next(year)
}
