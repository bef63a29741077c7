use serde::{Deserialize, Serialize};

use crate::models::Anime;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query string of `GET /anime`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeQuery {
    pub title: Option<String>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnimeDetailDto {
    #[serde(flatten)]
    pub anime: Anime,
    pub average_rating: f64,
    pub rating_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingQuery {
    pub season: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteSearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub value: i32,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopRatedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistMembership {
    pub anime_id: i32,
    pub in_watchlist: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
