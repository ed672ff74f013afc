use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::Redirect,
};
use std::sync::Arc;

use super::validation::{MediaPath, parse_kind};
use super::{ApiError, ApiResponse, AppState, CurrentUser, MessageResponse};
use crate::filters::{CatalogFilters, QueryParams};
use crate::models::media::{MediaDetail, MediaForm};
use crate::models::page::CatalogPage;

/// GET /media/{kind}
/// Filtered, ordered, paginated catalog of one kind
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<CatalogPage>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let params = QueryParams::parse(query.as_deref());
    let filters = CatalogFilters::from_params(&params, kind.descriptor())
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    let page = state.catalog_service().list(kind, user.id, filters).await?;

    Ok(Json(ApiResponse::success(page)))
}

/// POST /media/{kind}
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(kind): Path<String>,
    Json(form): Json<MediaForm>,
) -> Result<(StatusCode, Json<ApiResponse<MediaDetail>>), ApiError> {
    let kind = parse_kind(&kind)?;

    let detail = state.catalog_service().create(kind, user.id, &form).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))))
}

/// GET /media/{kind}/{id}
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    MediaPath { kind, id }: MediaPath,
) -> Result<Json<ApiResponse<MediaDetail>>, ApiError> {
    let detail = state.catalog_service().get(kind, user.id, id).await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// PUT /media/{kind}/{id}
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    MediaPath { kind, id }: MediaPath,
    Json(form): Json<MediaForm>,
) -> Result<Json<ApiResponse<MediaDetail>>, ApiError> {
    let detail = state
        .catalog_service()
        .update(kind, user.id, id, &form)
        .await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// DELETE /media/{kind}/{id}
/// Removes the item and every library entry pointing at it
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    MediaPath { kind, id }: MediaPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.catalog_service().delete(kind, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "{kind} {id} deleted"
    )))))
}

/// POST /media/{kind}/{id}/toggle
/// Adds the item to the caller's library or removes it, then sends the
/// client back where it came from
pub async fn toggle_media(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    headers: HeaderMap,
    MediaPath { kind, id }: MediaPath,
) -> Result<Redirect, ApiError> {
    state.library_service().toggle(kind, user.id, id).await?;

    let fallback = format!("/api/media/{}", kind.slug());
    Ok(Redirect::to(&back_target(&headers, &fallback)))
}

/// The `Referer` when it points back at this host, otherwise `fallback`.
fn back_target(headers: &HeaderMap, fallback: &str) -> String {
    let Some(referer) = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
    else {
        return fallback.to_string();
    };

    if referer.starts_with('/') && !referer.starts_with("//") {
        return referer.to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    match (url::Url::parse(referer), host) {
        (Ok(url), Some(host)) if authority(&url).as_deref() == Some(host) => referer.to_string(),
        _ => fallback.to_string(),
    }
}

fn authority(url: &url::Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(referer: Option<&'static str>, host: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        if let Some(referer) = referer {
            headers.insert(header::REFERER, HeaderValue::from_static(referer));
        }
        headers
    }

    #[test]
    fn missing_referer_uses_fallback() {
        assert_eq!(
            back_target(&headers(None, "localhost:8000"), "/api/media/anime"),
            "/api/media/anime"
        );
    }

    #[test]
    fn same_host_referer_is_followed() {
        let h = headers(
            Some("http://localhost:8000/api/media/anime?page=2"),
            "localhost:8000",
        );
        assert_eq!(
            back_target(&h, "/api/media/anime"),
            "http://localhost:8000/api/media/anime?page=2"
        );

        let h = headers(Some("/api/library/anime"), "localhost:8000");
        assert_eq!(back_target(&h, "/api/media/anime"), "/api/library/anime");
    }

    #[test]
    fn foreign_referer_is_ignored() {
        let h = headers(Some("https://evil.example/phish"), "localhost:8000");
        assert_eq!(back_target(&h, "/api/media/movies"), "/api/media/movies");

        let h = headers(Some("//evil.example/phish"), "localhost:8000");
        assert_eq!(back_target(&h, "/api/media/movies"), "/api/media/movies");
    }
}
