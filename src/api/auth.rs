use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::{Principal, UserId};
use crate::services::{LoginResult, Registration, UserInfo};

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller and stores the [`Principal`] in the request extensions.
/// Checks, in order:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// Anonymous requests pass through; handlers that need a caller take a
/// [`Principal`] argument and reject with 401 when none was resolved.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(principal) = resolve_principal(&state, &headers, &session).await {
        tracing::Span::current().record("user_id", principal.user_id.value());
        request.extensions_mut().insert(principal);
    }

    next.run(request).await
}

async fn resolve_principal(
    state: &AppState,
    headers: &HeaderMap,
    session: &Session,
) -> Option<Principal> {
    let auth = &state.shared.auth_service;

    // Session first (fastest path for browsers)
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        match auth.principal_for_user(UserId::new(user_id)).await {
            Ok(Some(principal)) => return Some(principal),
            Ok(None) => {
                // Account deleted while the session was alive
                let _ = session.flush().await;
            }
            Err(e) => tracing::error!("Failed to resolve session user: {e}"),
        }
    }

    let key = extract_api_key(headers)?;
    match auth.principal_for_api_key(&key).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::error!("Failed to verify API key: {e}");
            None
        }
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Registration>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.shared.auth_service.register(form).await?;
    tracing::info!("Registered user {}", user.username);
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with username and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .shared
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    // New session id on login
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, result.user.id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logged out",
    ))))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.shared.auth_service.me(&principal).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .auth_service
        .change_password(
            &principal,
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /auth/api-key
pub async fn get_api_key(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.shared.auth_service.get_api_key(&principal).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state
        .shared
        .auth_service
        .regenerate_api_key(&principal)
        .await?;

    tracing::info!("API key regenerated for user: {}", principal.username);
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}
