use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_anime_id, validate_record_id};
use super::{ApiError, ApiResponse, AppState, CommentRequest, MessageResponse};
use crate::domain::Principal;
use crate::models::Comment;

/// GET /anime/{id}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Comment>>>, ApiError> {
    let id = validate_anime_id(id)?;
    let comments = state.shared.comment_service.list_for_anime(id).await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// POST /anime/{id}/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<ApiResponse<Comment>>, ApiError> {
    let id = validate_anime_id(id)?;
    let comment = state
        .shared
        .comment_service
        .add(&principal, id, &payload.content)
        .await?;

    Ok(Json(ApiResponse::success(comment)))
}

/// GET /anime/{id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((id, comment_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<Comment>>, ApiError> {
    let id = validate_anime_id(id)?;
    let comment_id = validate_record_id("comment", comment_id)?;

    let comment = state
        .shared
        .comment_service
        .get_own(&principal, id, comment_id)
        .await?;

    Ok(Json(ApiResponse::success(comment)))
}

/// PUT /anime/{id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((id, comment_id)): Path<(i32, i32)>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<ApiResponse<Comment>>, ApiError> {
    let id = validate_anime_id(id)?;
    let comment_id = validate_record_id("comment", comment_id)?;

    let comment = state
        .shared
        .comment_service
        .update(&principal, id, comment_id, &payload.content)
        .await?;

    Ok(Json(ApiResponse::success(comment)))
}

/// DELETE /anime/{id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((id, comment_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_anime_id(id)?;
    let comment_id = validate_record_id("comment", comment_id)?;

    state
        .shared
        .comment_service
        .delete(&principal, id, comment_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Comment {comment_id} deleted"
    )))))
}
