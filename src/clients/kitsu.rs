//! Client for the public Kitsu catalog API (JSON:API flavoured).

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::KitsuConfig;
use crate::models::anime::AnimeDraft;

const JSON_API: &str = "application/vnd.api+json";

#[derive(Debug, Deserialize)]
struct KitsuResponse<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct KitsuAnime {
    pub id: String,
    pub attributes: KitsuAnimeAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitsuAnimeAttributes {
    #[serde(rename = "canonicalTitle")]
    pub canonical_title: Option<String>,
    #[serde(default)]
    pub titles: KitsuTitles,
    pub synopsis: Option<String>,
    #[serde(rename = "posterImage")]
    pub poster_image: Option<KitsuImage>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "episodeCount")]
    pub episode_count: Option<i32>,
    #[serde(rename = "episodeLength")]
    pub episode_length: Option<i32>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "ageRatingGuide")]
    pub age_rating_guide: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitsuTitles {
    pub en: Option<String>,
    pub en_jp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KitsuImage {
    pub original: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl KitsuAnime {
    /// Maps a Kitsu record onto a catalog draft. Returns `None` when the
    /// record has no usable title.
    #[must_use]
    pub fn into_draft(self) -> Option<AnimeDraft> {
        let attrs = self.attributes;
        let title = non_empty(attrs.titles.en)
            .or_else(|| non_empty(attrs.titles.en_jp))
            .or_else(|| non_empty(attrs.canonical_title))?;

        Some(AnimeDraft {
            title,
            synopsis: non_empty(attrs.synopsis),
            image: attrs.poster_image.and_then(|img| non_empty(img.original)),
            start_date: parse_date(attrs.start_date.as_deref()),
            end_date: parse_date(attrs.end_date.as_deref()),
            episode_count: attrs.episode_count,
            episode_length: attrs.episode_length,
            subtype: non_empty(attrs.subtype),
            status: non_empty(attrs.status),
            age_rating_guide: non_empty(attrs.age_rating_guide),
        })
    }
}

/// Broadcast season as Kitsu names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    #[must_use]
    pub const fn of_month(month: u32) -> Self {
        match month {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        }
    }

    /// Season and year containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> (Self, i32) {
        (Self::of_month(date.month()), date.year())
    }

    /// The season after this one, rolling the year over after fall.
    #[must_use]
    pub const fn next(self, year: i32) -> (Self, i32) {
        match self {
            Self::Winter => (Self::Spring, year),
            Self::Spring => (Self::Summer, year),
            Self::Summer => (Self::Fall, year),
            Self::Fall => (Self::Winter, year + 1),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            other => Err(format!("Unknown season '{other}'")),
        }
    }
}

/// Builds the HTTP client used for Kitsu. Calls are never retried, so the
/// connect and read timeouts bound every request.
pub fn build_http_client(config: &KitsuConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .read_timeout(Duration::from_secs(config.read_timeout_seconds))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .context("Failed to build Kitsu HTTP client")
}

#[derive(Clone)]
pub struct KitsuClient {
    client: Client,
    base_url: String,
}

impl KitsuClient {
    pub fn new(config: &KitsuConfig) -> Result<Self> {
        Ok(Self::with_shared_client(
            build_http_client(config)?,
            &config.base_url,
        ))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, title: &str) -> String {
        format!(
            "{}/anime?filter[text]={}",
            self.base_url,
            urlencoding::encode(title)
        )
    }

    fn seasonal_url(&self, season: Season, year: i32, limit: u32) -> String {
        format!(
            "{}/anime?filter[seasonYear]={year}&filter[season]={season}&page[limit]={limit}&sort=-averageRating",
            self.base_url
        )
    }

    async fn fetch(&self, url: &str) -> Result<Vec<AnimeDraft>> {
        let response: KitsuResponse<KitsuAnime> = self
            .client
            .get(url)
            .header(ACCEPT, JSON_API)
            .send()
            .await
            .context("Kitsu request failed")?
            .error_for_status()
            .context("Kitsu returned an error status")?
            .json()
            .await
            .context("Failed to decode Kitsu response")?;

        Ok(response
            .data
            .into_iter()
            .filter_map(KitsuAnime::into_draft)
            .collect())
    }

    /// Free-text search by title.
    pub async fn search_anime(&self, title: &str) -> Result<Vec<AnimeDraft>> {
        tracing::debug!("Searching Kitsu for '{title}'");
        self.fetch(&self.search_url(title)).await
    }

    /// Highest rated titles of a season.
    pub async fn seasonal(&self, season: Season, year: i32, limit: u32) -> Result<Vec<AnimeDraft>> {
        tracing::debug!("Fetching Kitsu {season} {year} top {limit}");
        self.fetch(&self.seasonal_url(season, year, limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": [
            {
                "id": "1",
                "type": "anime",
                "attributes": {
                    "canonicalTitle": "Cowboy Bebop",
                    "titles": {"en": "Cowboy Bebop", "en_jp": "Cowboy Bebop", "ja_jp": "カウボーイビバップ"},
                    "synopsis": "In the year 2071...",
                    "posterImage": {"original": "https://media.kitsu.io/anime/poster_images/1/original.jpg"},
                    "startDate": "1998-04-03",
                    "endDate": "1999-04-24",
                    "episodeCount": 26,
                    "episodeLength": 25,
                    "subtype": "TV",
                    "status": "finished",
                    "ageRatingGuide": "17+ (violence & profanity)"
                }
            },
            {
                "id": "2",
                "type": "anime",
                "attributes": {
                    "canonicalTitle": "Sousou no Frieren",
                    "titles": {"en_jp": "Sousou no Frieren"},
                    "startDate": null,
                    "subtype": "TV"
                }
            },
            {
                "id": "3",
                "type": "anime",
                "attributes": {"titles": {}}
            }
        ]
    }"#;

    fn drafts() -> Vec<AnimeDraft> {
        let response: KitsuResponse<KitsuAnime> = serde_json::from_str(SAMPLE).unwrap();
        response
            .data
            .into_iter()
            .filter_map(KitsuAnime::into_draft)
            .collect()
    }

    #[test]
    fn test_maps_full_record() {
        let drafts = drafts();
        let bebop = &drafts[0];
        assert_eq!(bebop.title, "Cowboy Bebop");
        assert_eq!(bebop.episode_count, Some(26));
        assert_eq!(bebop.episode_length, Some(25));
        assert_eq!(bebop.start_date, NaiveDate::from_ymd_opt(1998, 4, 3));
        assert_eq!(
            bebop.image.as_deref(),
            Some("https://media.kitsu.io/anime/poster_images/1/original.jpg")
        );
        assert_eq!(bebop.status.as_deref(), Some("finished"));
    }

    #[test]
    fn test_title_falls_back_and_untitled_records_are_dropped() {
        let drafts = drafts();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].title, "Sousou no Frieren");
        assert_eq!(drafts[1].start_date, None);
        assert_eq!(drafts[1].image, None);
    }

    #[test]
    fn test_search_url_encodes_title() {
        let client = KitsuClient::with_shared_client(Client::new(), "https://kitsu.io/api/edge/");
        assert_eq!(
            client.search_url("Steins;Gate 0"),
            "https://kitsu.io/api/edge/anime?filter[text]=Steins%3BGate%200"
        );
    }

    #[test]
    fn test_seasonal_url() {
        let client = KitsuClient::with_shared_client(Client::new(), "https://kitsu.io/api/edge");
        assert_eq!(
            client.seasonal_url(Season::Spring, 2024, 9),
            "https://kitsu.io/api/edge/anime?filter[seasonYear]=2024&filter[season]=spring&page[limit]=9&sort=-averageRating"
        );
    }

    #[test]
    fn test_season_arithmetic() {
        assert_eq!(Season::of_month(2), Season::Winter);
        assert_eq!(Season::of_month(11), Season::Fall);
        assert_eq!(Season::Fall.next(2024), (Season::Winter, 2025));
        assert_eq!(Season::Spring.next(2024), (Season::Summer, 2024));
        let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(Season::containing(date), (Season::Summer, 2024));
        assert_eq!("Autumn".parse::<Season>(), Ok(Season::Fall));
    }
}
