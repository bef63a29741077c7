pub mod anime;
pub mod comment;
pub mod rating;
pub mod user;
pub mod watchlist;
