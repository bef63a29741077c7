use serde::Serialize;

use crate::domain::{AnimeId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub id: i32,
    pub user_id: UserId,
    pub anime_id: AnimeId,
    pub value: i32,
    pub user_anime_key: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub anime_id: AnimeId,
    pub average: f64,
    pub count: usize,
}
