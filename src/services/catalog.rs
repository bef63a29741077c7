//! In-memory filtering and ordering of the catalog.
//!
//! The whole catalog is loaded once per query and narrowed here. Sorting is
//! stable, so entries with equal keys keep their storage order.

use std::cmp::Ordering;

use crate::domain::SortBy;
use crate::models::anime::Anime;

/// Optional catalog filters. Every filter that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive exact subtype (e.g. "TV", "movie")
    pub subtype: Option<String>,
    /// Case-insensitive exact lifecycle status
    pub status: Option<String>,
    pub sort_by: Option<SortBy>,
}

impl CatalogFilter {
    /// Drops blank values so they behave like absent ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            title: clean(self.title),
            subtype: clean(self.subtype),
            status: clean(self.status),
            sort_by: self.sort_by,
        }
    }

    fn matches(&self, anime: &Anime, title_needle: Option<&str>) -> bool {
        if let Some(needle) = title_needle
            && !anime.title.to_lowercase().contains(needle)
        {
            return false;
        }

        if let Some(subtype) = &self.subtype
            && !anime
                .subtype
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(subtype))
        {
            return false;
        }

        if let Some(status) = &self.status
            && !anime
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(status))
        {
            return false;
        }

        true
    }
}

/// Missing keys order first ascending and last descending.
fn compare(a: &Anime, b: &Anime, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Oldest => a.start_date.cmp(&b.start_date),
        SortBy::Newest => b.start_date.cmp(&a.start_date),
        SortBy::Lowest => a.episode_count.cmp(&b.episode_count),
        SortBy::Highest => b.episode_count.cmp(&a.episode_count),
    }
}

/// Applies `filter` to `catalog` and returns the surviving entries in order.
#[must_use]
pub fn query_anime(catalog: Vec<Anime>, filter: &CatalogFilter) -> Vec<Anime> {
    let title_needle = filter.title.as_deref().map(str::to_lowercase);

    let mut result: Vec<Anime> = catalog
        .into_iter()
        .filter(|anime| filter.matches(anime, title_needle.as_deref()))
        .collect();

    if let Some(sort_by) = filter.sort_by {
        result.sort_by(|a, b| compare(a, b, sort_by));
    }

    result
}
