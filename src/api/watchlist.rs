use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_anime_id;
use super::{ApiError, ApiResponse, AppState, WatchlistMembership};
use crate::domain::Principal;
use crate::models::Watchlist;

/// GET /watchlist
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<Watchlist>>, ApiError> {
    let watchlist = state
        .shared
        .watchlist_service
        .get(principal.user_id)
        .await?;

    Ok(Json(ApiResponse::success(watchlist)))
}

/// GET /watchlist/{anime_id}
pub async fn contains(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(anime_id): Path<i32>,
) -> Result<Json<ApiResponse<WatchlistMembership>>, ApiError> {
    let id = validate_anime_id(anime_id)?;
    let in_watchlist = state
        .shared
        .watchlist_service
        .contains(principal.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(WatchlistMembership {
        anime_id,
        in_watchlist,
    })))
}

/// POST /watchlist/{anime_id}
pub async fn add(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(anime_id): Path<i32>,
) -> Result<Json<ApiResponse<Watchlist>>, ApiError> {
    let id = validate_anime_id(anime_id)?;
    let watchlist = state
        .shared
        .watchlist_service
        .add(principal.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(watchlist)))
}

/// DELETE /watchlist/{anime_id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(anime_id): Path<i32>,
) -> Result<Json<ApiResponse<Watchlist>>, ApiError> {
    let id = validate_anime_id(anime_id)?;
    let watchlist = state
        .shared
        .watchlist_service
        .remove(principal.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(watchlist)))
}
