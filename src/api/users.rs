use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::{validate_limit, validate_user_id};
use super::{ApiError, ApiResponse, AppState, MessageResponse, TopRatedQuery};
use crate::domain::Principal;
use crate::models::{Anime, Comment};
use crate::services::{ProfileUpdate, UserInfo};

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    let users = state.shared.auth_service.list_users(&principal).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.shared.auth_service.get_user(&principal, id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state
        .shared
        .auth_service
        .update_user(&principal, id, update)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_user_id(id)?;
    state.shared.auth_service.delete_user(&principal, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User {id} deleted"
    )))))
}

/// GET /users/me/top-rated?limit=
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<TopRatedQuery>,
) -> Result<Json<ApiResponse<Vec<Anime>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let anime = state
        .shared
        .rating_service
        .top_n_for_user(principal.user_id, limit)
        .await?;

    Ok(Json(ApiResponse::success(anime)))
}

/// GET /users/me/comments
pub async fn my_comments(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<Vec<Comment>>>, ApiError> {
    let comments = state
        .shared
        .comment_service
        .list_for_user(principal.user_id)
        .await?;

    Ok(Json(ApiResponse::success(comments)))
}
