use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::AnimeId;

/// A catalog entry as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub synopsis: Option<String>,
    pub image: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub episode_count: Option<i32>,
    pub episode_length: Option<i32>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub age_rating_guide: Option<String>,
    pub created_at: String,
}

/// Catalog fields without identity. Produced by the Kitsu mapping and by
/// admin create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeDraft {
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub episode_count: Option<i32>,
    #[serde(default)]
    pub episode_length: Option<i32>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub age_rating_guide: Option<String>,
}
