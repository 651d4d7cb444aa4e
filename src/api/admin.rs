//! Catalog moderation, mounted behind `require_admin`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::validate_id;
use super::{ApiError, AppState, MediaAssetDto};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveResponse {
    pub message: &'static str,
    pub id: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct DefaultMediaResponse {
    pub message: &'static str,
    pub media: MediaAssetDto,
}

/// PUT /admin/movies/{id}/active
pub async fn set_movie_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ActiveRequest>,
) -> Result<Json<ActiveResponse>, ApiError> {
    let id = validate_id(id, "movie")?;
    state
        .catalog_service()
        .set_movie_active(id, payload.is_active)
        .await?;

    Ok(Json(ActiveResponse {
        message: "Movie updated",
        id,
        is_active: payload.is_active,
    }))
}

/// PUT /admin/series/{id}/active
pub async fn set_series_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ActiveRequest>,
) -> Result<Json<ActiveResponse>, ApiError> {
    let id = validate_id(id, "series")?;
    state
        .catalog_service()
        .set_series_active(id, payload.is_active)
        .await?;

    Ok(Json(ActiveResponse {
        message: "Series updated",
        id,
        is_active: payload.is_active,
    }))
}

/// PUT /admin/media/{id}/default
/// Clears the flag on every sibling of the same parent and type
pub async fn set_default_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DefaultMediaResponse>, ApiError> {
    let id = validate_id(id, "media")?;
    let media = state.catalog_service().set_default_media(id).await?;

    Ok(Json(DefaultMediaResponse {
        message: "Default media updated",
        media: media.into(),
    }))
}
