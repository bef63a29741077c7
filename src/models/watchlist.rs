use serde::Serialize;

use super::anime::Anime;
use crate::domain::UserId;

/// A user's watchlist with its entries in insertion order.
///
/// `id` and `created_at` stay empty until the first anime is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Watchlist {
    pub id: Option<i32>,
    pub user_id: UserId,
    pub created_at: Option<String>,
    pub anime: Vec<Anime>,
}

impl Watchlist {
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            created_at: None,
            anime: Vec::new(),
        }
    }
}
