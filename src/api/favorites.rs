use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::validate_id;
use super::{ApiError, AppState, FavoriteDto, MessageResponse};
use crate::domain::{CurrentUser, FavoriteTarget};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub movie_id: Option<i32>,
    pub series_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AddFavoriteResponse {
    pub message: &'static str,
    pub favorite: FavoriteDto,
}

/// GET /user/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<FavoriteDto>>, ApiError> {
    let favorites = state.user_content_service().list_favorites(user.id).await?;
    Ok(Json(favorites.into_iter().map(FavoriteDto::from).collect()))
}

/// POST /user/favorites
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<AddFavoriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let target = FavoriteTarget::from_parts(payload.movie_id, payload.series_id)
        .map_err(ApiError::validation)?;

    let favorite = state
        .user_content_service()
        .add_favorite(user.id, target)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddFavoriteResponse {
            message: "Added to favorites",
            favorite: favorite.into(),
        }),
    ))
}

/// DELETE /user/favorites/{id}
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = validate_id(id, "favorite")?;
    state
        .user_content_service()
        .remove_favorite(user.id, id)
        .await?;
    Ok(Json(MessageResponse::new("Removed from favorites")))
}
