use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::{parse_optional, require_media_type, validate_id};
use super::{ApiError, AppState};
use crate::domain::{CurrentUser, ListSort, NewWatchlistItem, PageRequest, WatchlistQuery};
use crate::services::user_content_service::{WatchlistItemView, WatchlistPage};

const DEFAULT_LIMIT: u64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchlistRequest {
    pub tmdb_id: Option<i64>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistListQuery {
    pub media_type: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistCheckQuery {
    pub tmdb_id: Option<i64>,
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddWatchlistResponse {
    pub message: &'static str,
    pub item: WatchlistItemView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedItem {
    pub id: i32,
    pub title: String,
    pub media_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWatchlistResponse {
    pub message: &'static str,
    pub removed_item: RemovedItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedItem {
    pub id: i32,
    pub added_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistCheckResponse {
    pub in_watchlist: bool,
    pub item: Option<CheckedItem>,
}

fn require_title_kind(value: Option<&str>) -> Result<crate::domain::MediaType, ApiError> {
    let media_type = require_media_type(value)?;
    if !media_type.is_title() {
        return Err(ApiError::validation("mediaType must be 'movie' or 'tv'"));
    }
    Ok(media_type)
}

/// GET /user/watchlist
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<WatchlistListQuery>,
) -> Result<Json<WatchlistPage>, ApiError> {
    let query = WatchlistQuery {
        media_type: parse_optional(params.media_type.as_deref(), "mediaType")?,
        sort: ListSort::parse(params.sort_by.as_deref(), params.order.as_deref()),
        page: PageRequest::new(params.limit, None, params.page, DEFAULT_LIMIT),
    };

    Ok(Json(
        state.user_content_service().watchlist(user.id, query).await?,
    ))
}

/// POST /user/watchlist
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<AddWatchlistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(tmdb_id), Some(title)) = (payload.tmdb_id, payload.title) else {
        return Err(ApiError::validation("tmdbId, mediaType and title are required"));
    };
    let media_type = require_title_kind(payload.media_type.as_deref())?;

    let item = state
        .user_content_service()
        .add_to_watchlist(
            user.id,
            NewWatchlistItem {
                tmdb_id,
                media_type,
                title,
                poster_path: payload.poster_path,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddWatchlistResponse {
            message: "Added to watchlist",
            item,
        }),
    ))
}

/// DELETE /user/watchlist/{id}
pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<RemoveWatchlistResponse>, ApiError> {
    let id = validate_id(id, "watchlist item")?;
    let removed = state
        .user_content_service()
        .remove_from_watchlist(user.id, id)
        .await?;

    Ok(Json(RemoveWatchlistResponse {
        message: "Removed from watchlist",
        removed_item: RemovedItem {
            id: removed.id,
            title: removed.title,
            media_type: removed.media_type,
        },
    }))
}

/// GET /user/watchlist/check
pub async fn check_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<WatchlistCheckQuery>,
) -> Result<Json<WatchlistCheckResponse>, ApiError> {
    let tmdb_id = params
        .tmdb_id
        .ok_or_else(|| ApiError::validation("tmdbId and mediaType are required"))?;
    let media_type = require_title_kind(params.media_type.as_deref())?;

    let existing = state
        .user_content_service()
        .check_watchlist(user.id, tmdb_id, media_type)
        .await?;

    Ok(Json(WatchlistCheckResponse {
        in_watchlist: existing.is_some(),
        item: existing.map(|m| CheckedItem {
            id: m.id,
            added_at: m.added_at,
        }),
    }))
}
