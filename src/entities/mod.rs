pub mod prelude;

pub mod anime;
pub mod comments;
pub mod ratings;
pub mod users;
pub mod watchlist_anime;
pub mod watchlists;
