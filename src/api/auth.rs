use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::{ApiError, AppState};
use crate::domain::CurrentUser;
use crate::services::{LoginResult, Registration, UserProfile};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` or `X-Api-Key` to a [`CurrentUser`]
/// request extension. Anything else is rejected with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).ok_or_else(ApiError::unauthorized)?;

    let user = state
        .auth_service()
        .authenticate(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Must run after [`auth_middleware`].
pub async fn require_admin(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.is_admin() {
        return Err(ApiError::forbidden());
    }
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string()).filter(|t| !t.is_empty());
    }

    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string()).filter(|t| !t.is_empty());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth_service()
        .register(Registration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            avatar: payload.avatar,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// POST /auth/login
/// Returns the bearer token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResult>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    tracing::info!(user_id = result.user.id, "User logged in");
    Ok(Json(result))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.auth_service().profile(user.id).await?))
}

/// POST /auth/token/regenerate
pub async fn regenerate_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth_service().regenerate_token(user.id).await?;
    Ok(Json(TokenResponse {
        message: "Token regenerated",
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        headers.insert("X-Api-Key", HeaderValue::from_static("abc"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));

        headers.insert("Authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_token_ignores_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_token(&headers), None);
    }
}
