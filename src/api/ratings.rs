use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_anime_id, validate_record_id};
use super::{ApiError, ApiResponse, AppState, MessageResponse, RatingRequest};
use crate::domain::Principal;
use crate::models::{Rating, RatingSummary};

/// GET /anime/{id}/ratings
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Rating>>>, ApiError> {
    let id = validate_anime_id(id)?;
    let ratings = state.shared.rating_service.ratings_for_anime(id).await?;
    Ok(Json(ApiResponse::success(ratings)))
}

/// GET /anime/{id}/ratings/summary
pub async fn rating_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RatingSummary>>, ApiError> {
    let id = validate_anime_id(id)?;
    let summary = state.shared.rating_service.summary_for_anime(id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// PUT /anime/{id}/ratings
/// Creates or replaces the caller's rating.
pub async fn upsert_rating(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(payload): Json<RatingRequest>,
) -> Result<Json<ApiResponse<Rating>>, ApiError> {
    let id = validate_anime_id(id)?;
    let rating = state
        .shared
        .rating_service
        .upsert_rating(&principal, id, payload.value)
        .await?;

    Ok(Json(ApiResponse::success(rating)))
}

/// GET /anime/{id}/ratings/mine
pub async fn my_rating(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Rating>>, ApiError> {
    let id = validate_anime_id(id)?;
    let rating = state
        .shared
        .rating_service
        .rating_for_user(principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No rating for anime {id}")))?;

    Ok(Json(ApiResponse::success(rating)))
}

/// PUT /anime/{id}/ratings/{rating_id}
pub async fn update_rating(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((id, rating_id)): Path<(i32, i32)>,
    Json(payload): Json<RatingRequest>,
) -> Result<Json<ApiResponse<Rating>>, ApiError> {
    let id = validate_anime_id(id)?;
    let rating_id = validate_record_id("rating", rating_id)?;

    let rating = state
        .shared
        .rating_service
        .update_rating(&principal, id, rating_id, payload.value)
        .await?;

    Ok(Json(ApiResponse::success(rating)))
}

/// DELETE /anime/{id}/ratings/{rating_id}
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((id, rating_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_anime_id(id)?;
    let rating_id = validate_record_id("rating", rating_id)?;

    state
        .shared
        .rating_service
        .delete_rating(&principal, id, rating_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Rating {rating_id} deleted"
    )))))
}
