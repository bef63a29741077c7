use serde::Serialize;

use crate::domain::{AnimeId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i32,
    pub anime_id: AnimeId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}
