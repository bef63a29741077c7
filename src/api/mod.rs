use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

mod anime;
pub mod auth;
mod comments;
mod error;
mod observability;
mod ratings;
mod system;
mod types;
mod users;
mod validation;
mod watchlist;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_origins = &server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = api_routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(session_layer)
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// Every route under `/api`. Handlers that take a
/// [`Principal`](crate::domain::Principal) answer 401 to anonymous callers;
/// admin checks happen in the services.
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key", get(auth::get_api_key))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        // catalog
        .route("/anime", get(anime::list_anime).post(anime::create_anime))
        .route("/anime/trending", get(anime::trending))
        .route("/anime/upcoming", get(anime::upcoming))
        .route("/anime/remote", get(anime::search_remote))
        .route("/anime/import", post(anime::import_anime))
        .route(
            "/anime/{id}",
            get(anime::get_anime)
                .put(anime::update_anime)
                .delete(anime::delete_anime),
        )
        // ratings
        .route(
            "/anime/{id}/ratings",
            get(ratings::list_ratings).put(ratings::upsert_rating),
        )
        .route("/anime/{id}/ratings/summary", get(ratings::rating_summary))
        .route("/anime/{id}/ratings/mine", get(ratings::my_rating))
        .route(
            "/anime/{id}/ratings/{rating_id}",
            put(ratings::update_rating).delete(ratings::delete_rating),
        )
        // comments
        .route(
            "/anime/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/anime/{id}/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        // watchlist
        .route("/watchlist", get(watchlist::get_watchlist))
        .route(
            "/watchlist/{anime_id}",
            get(watchlist::contains)
                .post(watchlist::add)
                .delete(watchlist::remove),
        )
        // users
        .route("/users", get(users::list_users))
        .route("/users/me/top-rated", get(users::top_rated))
        .route("/users/me/comments", get(users::my_comments))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // system
        .route("/system/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
}
