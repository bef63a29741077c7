pub mod anime;
pub mod comment;
pub mod rating;
pub mod watchlist;

pub use anime::{Anime, AnimeDraft};
pub use comment::Comment;
pub use rating::{Rating, RatingSummary};
pub use watchlist::Watchlist;
