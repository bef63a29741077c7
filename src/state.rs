use std::sync::Arc;

use crate::clients::KitsuClient;
use crate::clients::kitsu::build_http_client;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnimeService, AuthService, CommentService, RatingService, SeaOrmAnimeService,
    SeaOrmAuthService, SeaOrmCommentService, SeaOrmRatingService, SeaOrmWatchlistService,
    WatchlistService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub kitsu: KitsuClient,

    pub anime_service: Arc<dyn AnimeService>,

    pub rating_service: Arc<dyn RatingService>,

    pub comment_service: Arc<dyn CommentService>,

    pub watchlist_service: Arc<dyn WatchlistService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    /// Connects to the database, runs migrations and wires the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services over an existing store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        // One pooled client for every Kitsu call.
        let http_client = build_http_client(&config.kitsu)?;
        let kitsu = KitsuClient::with_shared_client(http_client, &config.kitsu.base_url);

        let anime_service = Arc::new(SeaOrmAnimeService::new(store.clone(), kitsu.clone()))
            as Arc<dyn AnimeService>;
        let rating_service =
            Arc::new(SeaOrmRatingService::new(store.clone())) as Arc<dyn RatingService>;
        let comment_service =
            Arc::new(SeaOrmCommentService::new(store.clone())) as Arc<dyn CommentService>;
        let watchlist_service =
            Arc::new(SeaOrmWatchlistService::new(store.clone())) as Arc<dyn WatchlistService>;
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            kitsu,
            anime_service,
            rating_service,
            comment_service,
            watchlist_service,
            auth_service,
        })
    }
}
