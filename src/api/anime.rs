use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::{parse_season, parse_sort_by, validate_anime_id, validate_search_query};
use super::{
    AnimeDetailDto, AnimeQuery, ApiError, ApiResponse, AppState, ImportRequest, MessageResponse,
    RemoteSearchQuery, TrendingQuery,
};
use crate::domain::Principal;
use crate::models::{Anime, AnimeDraft};
use crate::services::{CatalogFilter, TrendingAnime};

/// GET /anime
pub async fn list_anime(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnimeQuery>,
) -> Result<Json<ApiResponse<Vec<Anime>>>, ApiError> {
    let filter = CatalogFilter {
        title: query.title,
        subtype: query.subtype,
        status: query.status,
        sort_by: parse_sort_by(query.sort_by.as_deref())?,
    }
    .normalized();

    let anime = state.shared.anime_service.query(&filter).await?;
    Ok(Json(ApiResponse::success(anime)))
}

/// GET /anime/{id}
/// The entry together with its rating summary.
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AnimeDetailDto>>, ApiError> {
    let id = validate_anime_id(id)?;
    let anime = state.shared.anime_service.get(id).await?;
    let summary = state.shared.rating_service.summary_for_anime(id).await?;

    Ok(Json(ApiResponse::success(AnimeDetailDto {
        anime,
        average_rating: summary.average,
        rating_count: summary.count,
    })))
}

/// GET /anime/trending?season=&year=
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<TrendingAnime>>>, ApiError> {
    let season = parse_season(query.season.as_deref())?;
    let list = state
        .shared
        .anime_service
        .trending(season, query.year)
        .await?;

    Ok(Json(ApiResponse::success(list)))
}

/// GET /anime/upcoming
pub async fn upcoming(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TrendingAnime>>>, ApiError> {
    let list = state.shared.anime_service.upcoming().await?;
    Ok(Json(ApiResponse::success(list)))
}

/// POST /anime
pub async fn create_anime(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<AnimeDraft>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let anime = state
        .shared
        .anime_service
        .create(&principal, draft)
        .await?;

    Ok(Json(ApiResponse::success(anime)))
}

/// PUT /anime/{id}
pub async fn update_anime(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(draft): Json<AnimeDraft>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let id = validate_anime_id(id)?;
    let anime = state
        .shared
        .anime_service
        .update(&principal, id, draft)
        .await?;

    Ok(Json(ApiResponse::success(anime)))
}

/// DELETE /anime/{id}
pub async fn delete_anime(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_anime_id(id)?;
    state.shared.anime_service.delete(&principal, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Anime {id} deleted"
    )))))
}

/// GET /anime/remote?q=
pub async fn search_remote(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<RemoteSearchQuery>,
) -> Result<Json<ApiResponse<Vec<AnimeDraft>>>, ApiError> {
    let q = validate_search_query(&query.q)?;
    let results = state
        .shared
        .anime_service
        .search_remote(&principal, q)
        .await?;

    Ok(Json(ApiResponse::success(results)))
}

/// POST /anime/import
pub async fn import_anime(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ApiResponse<Anime>>, ApiError> {
    let title = validate_search_query(&payload.title)?;
    let anime = state
        .shared
        .anime_service
        .import_by_title(&principal, title)
        .await?;

    Ok(Json(ApiResponse::success(anime)))
}
