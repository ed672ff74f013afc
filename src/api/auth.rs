use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::constants::session::USER_ID_KEY;
use crate::services::{Registration, UserInfo};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The user a protected request runs as, placed in the request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

impl From<&UserInfo> for CurrentUser {
    fn from(user: &UserInfo) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
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
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login or registration)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// Anonymous requests are redirected to the login URL with the requested
/// path carried in `next`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_user(&state, &headers, &session).await {
        tracing::Span::current().record("user_id", user.id);
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }

    let requested = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().clone(), |original| original.0.clone());
    let requested = requested
        .path_and_query()
        .map_or_else(|| requested.path().to_string(), ToString::to_string);

    let login_url = state.config().read().await.server.login_url.clone();
    Redirect::to(&login_redirect(&login_url, &requested)).into_response()
}

async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
    session: &Session,
) -> Option<CurrentUser> {
    // Check session first (fastest path for browsers)
    match session.get::<i32>(USER_ID_KEY).await {
        Ok(Some(user_id)) => match state.auth_service().get_user(user_id).await {
            Ok(user) => return Some(CurrentUser::from(&user)),
            Err(e) => {
                tracing::debug!(user_id, "Session refers to an unusable account: {e}");
                let _ = session.flush().await;
            }
        },
        Ok(None) => {}
        Err(e) => tracing::warn!("Session lookup failed: {e}"),
    }

    let key = extract_api_key(headers)?;
    match state.auth_service().verify_api_key(&key).await {
        Ok(user) => user.as_ref().map(CurrentUser::from),
        Err(e) => {
            tracing::warn!("API key verification failed: {e}");
            None
        }
    }
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

fn login_redirect(login_url: &str, requested: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!(
        "{login_url}{separator}next={}",
        urlencoding::encode(requested)
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account and log the new user in
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<Registration>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let user = state.auth_service().register(&payload).await?;

    start_session(&session, user.id).await?;

    tracing::info!(user_id = user.id, "Registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// POST /auth/login
/// Authenticate with username and password
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::InvalidField {
            field: "username".to_string(),
            message: "This field is required.".to_string(),
        });
    }
    if payload.password.is_empty() {
        return Err(ApiError::InvalidField {
            field: "password".to_string(),
            message: "This field is required.".to_string(),
        });
    }

    let user = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    start_session(&session, user.id).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
/// Current user information
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let info = state.auth_service().get_user(user.id).await?;
    Ok(Json(ApiResponse::success(info)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn start_session(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(USER_ID_KEY, user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn login_redirect_encodes_next() {
        assert_eq!(
            login_redirect("/login", "/api/media/anime?page=2&title=a b"),
            "/login?next=%2Fapi%2Fmedia%2Fanime%3Fpage%3D2%26title%3Da%20b"
        );
        assert_eq!(
            login_redirect("/login?theme=dark", "/api/genres"),
            "/login?theme=dark&next=%2Fapi%2Fgenres"
        );
    }

    #[test]
    fn api_key_header_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_static("from-header"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("from-header"));

        headers.remove("X-Api-Key");
        assert_eq!(extract_api_key(&headers).as_deref(), Some("from-bearer"));

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_api_key(&headers), None);
    }
}
