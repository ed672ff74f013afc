use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::media::Genre;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateGenreRequest {
    pub name: String,
}

/// GET /genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Genre>>>, ApiError> {
    let genres = state.catalog_service().list_genres().await?;
    Ok(Json(ApiResponse::success(genres)))
}

/// POST /genres
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateGenreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Genre>>), ApiError> {
    let genre = state.catalog_service().create_genre(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(genre))))
}
