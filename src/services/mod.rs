pub mod catalog;
pub use catalog::{CatalogFilter, query_anime};

pub mod anime_service;
pub use anime_service::{AnimeError, AnimeService, TrendingAnime};

pub mod anime_service_impl;
pub use anime_service_impl::SeaOrmAnimeService;

pub mod rating_service;
pub mod rating_service_impl;
pub use rating_service::{RatingError, RatingService, average_rating};
pub use rating_service_impl::SeaOrmRatingService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::{CommentError, CommentService, MAX_COMMENT_LENGTH};
pub use comment_service_impl::SeaOrmCommentService;

pub mod watchlist_service;
pub mod watchlist_service_impl;
pub use watchlist_service::{WatchlistError, WatchlistService};
pub use watchlist_service_impl::SeaOrmWatchlistService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, LoginResult, ProfileUpdate, Registration, UserInfo,
};
pub use auth_service_impl::SeaOrmAuthService;
