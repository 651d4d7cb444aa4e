use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::ratings::ContentQuery;
use super::validation::{external_ref, parse_optional};
use super::{ApiError, AppState};
use crate::domain::{
    CurrentUser, HistoryClear, HistoryQuery, ListSort, PageRequest, WatchProgressInput,
    parse_timestamp,
};
use crate::services::user_content_service::{
    HistoryPage, ProgressView, UpsertAction, WatchHistoryView,
};

const DEFAULT_LIMIT: u64 = 20;
const CONTINUE_WATCHING_LIMIT: u64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub tmdb_id: Option<i64>,
    pub media_type: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub progress: i32,
    pub duration: Option<i32>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryListQuery {
    pub media_type: Option<String>,
    pub completed: Option<bool>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryRequest {
    pub media_type: Option<String>,
    pub before_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContinueWatchingQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub message: &'static str,
    pub watch_history: WatchHistoryView,
    pub action: UpsertAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgressResponse {
    pub progress: Option<ProgressView>,
    pub has_progress: bool,
}

#[derive(Debug, Serialize)]
pub struct ContinueWatchingResponse {
    pub items: Vec<WatchHistoryView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// POST /user/history
/// Upserts progress for one content target; 201 on first record
pub async fn record_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<ProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = payload
        .title
        .ok_or_else(|| ApiError::validation("tmdbId, mediaType and title are required"))?;
    let content = external_ref(
        payload.tmdb_id,
        payload.media_type.as_deref(),
        payload.season_number,
        payload.episode_number,
    )?;

    let saved = state
        .user_content_service()
        .record_progress(
            user.id,
            content,
            WatchProgressInput {
                title,
                poster_path: payload.poster_path,
                progress: payload.progress,
                duration: payload.duration,
                completed: payload.completed,
            },
        )
        .await?;

    let status = match saved.action {
        UpsertAction::Created => StatusCode::CREATED,
        UpsertAction::Updated => StatusCode::OK,
    };

    Ok((
        status,
        Json(ProgressResponse {
            message: "Watch history updated",
            watch_history: saved.watch_history,
            action: saved.action,
        }),
    ))
}

/// GET /user/history
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<HistoryListQuery>,
) -> Result<Json<HistoryPage>, ApiError> {
    let query = HistoryQuery {
        media_type: parse_optional(params.media_type.as_deref(), "mediaType")?,
        completed: params.completed,
        sort: ListSort::parse(params.sort_by.as_deref(), params.order.as_deref()),
        page: PageRequest::new(params.limit, None, params.page, DEFAULT_LIMIT),
    };

    Ok(Json(
        state.user_content_service().history(user.id, query).await?,
    ))
}

/// GET /user/progress
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ContentQuery>,
) -> Result<Json<WatchProgressResponse>, ApiError> {
    let content = external_ref(
        params.tmdb_id,
        params.media_type.as_deref(),
        params.season_number,
        params.episode_number,
    )?;

    let progress = state
        .user_content_service()
        .progress(user.id, content)
        .await?;

    Ok(Json(WatchProgressResponse {
        has_progress: progress.is_some(),
        progress,
    }))
}

/// GET /user/continue-watching
pub async fn continue_watching(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ContinueWatchingQuery>,
) -> Result<Json<ContinueWatchingResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(CONTINUE_WATCHING_LIMIT)
        .clamp(1, PageRequest::MAX_LIMIT);

    let items = state
        .user_content_service()
        .continue_watching(user.id, limit)
        .await?;

    Ok(Json(ContinueWatchingResponse {
        count: items.len(),
        items,
    }))
}

/// POST /user/history/clear
/// Irreversible bulk delete; an empty body clears everything
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Option<ApiJson<ClearHistoryRequest>>,
) -> Result<Json<ClearHistoryResponse>, ApiError> {
    let ApiJson(payload) = payload.unwrap_or_default();

    let before = payload
        .before_date
        .as_deref()
        .map(|raw| {
            parse_timestamp(raw)
                .ok_or_else(|| ApiError::validation(format!("Invalid beforeDate: {raw}")))
        })
        .transpose()?;

    let filter = HistoryClear {
        media_type: parse_optional(payload.media_type.as_deref(), "mediaType")?,
        before,
    };

    let deleted_count = state
        .user_content_service()
        .clear_history(user.id, filter)
        .await?;

    Ok(Json(ClearHistoryResponse {
        message: format!("{deleted_count} history entries removed"),
        deleted_count,
    }))
}
