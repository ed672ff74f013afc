use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use std::sync::Arc;

use super::validation::{MediaPath, parse_kind};
use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::filters::{LibraryFilters, QueryParams};
use crate::models::library::{LibraryEntry, LibrarySummary, LinkForm};
use crate::models::page::LibraryPage;

/// GET /library/summary
/// Entry counts per kind for the caller
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<LibrarySummary>>, ApiError> {
    let summary = state.library_service().summary(user.id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /library/{kind}
pub async fn list_library(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<LibraryPage>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let params = QueryParams::parse(query.as_deref());
    let filters =
        LibraryFilters::from_params(&params).map_err(|e| ApiError::NotFound(e.to_string()))?;

    let page = state.library_service().list(kind, user.id, filters).await?;

    Ok(Json(ApiResponse::success(page)))
}

/// GET /library/{kind}/{id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    MediaPath { kind, id }: MediaPath,
) -> Result<Json<ApiResponse<LibraryEntry>>, ApiError> {
    let entry = state.library_service().get_entry(kind, user.id, id).await?;

    Ok(Json(ApiResponse::success(entry)))
}

/// PUT|POST /library/{kind}/{id}
/// Sets rate, status and comment on an existing entry
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    MediaPath { kind, id }: MediaPath,
    Json(form): Json<LinkForm>,
) -> Result<Json<ApiResponse<LibraryEntry>>, ApiError> {
    let entry = state
        .library_service()
        .update_entry(kind, user.id, id, &form)
        .await?;

    Ok(Json(ApiResponse::success(entry)))
}
