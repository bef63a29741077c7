pub use super::anime::Entity as Anime;
pub use super::comments::Entity as Comments;
pub use super::ratings::Entity as Ratings;
pub use super::users::Entity as Users;
pub use super::watchlist_anime::Entity as WatchlistAnime;
pub use super::watchlists::Entity as Watchlists;
