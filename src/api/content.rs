//! TMDB-backed discovery endpoints under `/content`.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::validation::{parse_or_default, validate_page, validate_search_query};
use super::{ApiError, AppState};
use crate::clients::tmdb::{TimeWindow, TmdbGenre, TmdbKind, TrendingKind};
use crate::services::StreamOptions;
use crate::services::metadata_service::{AppPage, StreamInfo, StreamRequest};

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub subtitle_lang: Option<String>,
    pub subtitle_url: Option<String>,
    #[serde(default)]
    pub check: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct GenresResponse {
    pub genres: Vec<TmdbGenre>,
}

/// GET /content/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let query = validate_search_query(params.query.as_deref())?;
    let page = validate_page(params.page)?;
    Ok(Json(state.metadata_service().search(query, page).await?))
}

/// GET /content/popular
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let kind: TmdbKind = parse_or_default(params.kind.as_deref(), "type")?;
    let page = validate_page(params.page)?;
    Ok(Json(state.metadata_service().popular(kind, page).await?))
}

/// GET /content/trending
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let kind: TrendingKind = parse_or_default(params.kind.as_deref(), "type")?;
    let window: TimeWindow = parse_or_default(params.time.as_deref(), "time")?;
    let page = validate_page(params.page)?;
    Ok(Json(
        state.metadata_service().trending(kind, window, page).await?,
    ))
}

/// GET /content/top-rated
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let kind: TmdbKind = parse_or_default(params.kind.as_deref(), "type")?;
    let page = validate_page(params.page)?;
    Ok(Json(state.metadata_service().top_rated(kind, page).await?))
}

/// GET /content/upcoming
pub async fn upcoming(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let page = validate_page(params.page)?;
    Ok(Json(state.metadata_service().upcoming(page).await?))
}

/// GET /content/movie/{id}
pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.metadata_service().movie_details(id).await?))
}

/// GET /content/tv/{id}
pub async fn tv_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.metadata_service().tv_details(id).await?))
}

/// GET /content/tv/{tv_id}/season/{season_number}
pub async fn season_details(
    State(state): State<Arc<AppState>>,
    Path((tv_id, season_number)): Path<(i64, i32)>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        state
            .metadata_service()
            .season_details(tv_id, season_number)
            .await?,
    ))
}

/// GET /content/tv/{tv_id}/season/{season_number}/episode/{episode_number}
pub async fn episode_details(
    State(state): State<Arc<AppState>>,
    Path((tv_id, season_number, episode_number)): Path<(i64, i32, i32)>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        state
            .metadata_service()
            .episode_details(tv_id, season_number, episode_number)
            .await?,
    ))
}

/// GET /content/genres
pub async fn genres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<GenresResponse>, ApiError> {
    let kind: TmdbKind = parse_or_default(params.kind.as_deref(), "type")?;
    let genres = state.metadata_service().genres(kind).await?;
    Ok(Json(GenresResponse { genres }))
}

/// GET /content/genres/{genre_id}/discover
pub async fn discover_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<i64>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<AppPage>, ApiError> {
    let kind: TmdbKind = parse_or_default(params.kind.as_deref(), "type")?;
    let page = validate_page(params.page)?;
    Ok(Json(
        state
            .metadata_service()
            .discover_by_genre(genre_id, kind, page)
            .await?,
    ))
}

/// GET /content/stream/{type}/{id}
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((kind, tmdb_id)): Path<(String, i64)>,
    Query(params): Query<StreamQuery>,
) -> Result<Json<StreamInfo>, ApiError> {
    let kind: TmdbKind = kind
        .parse()
        .map_err(|e: String| ApiError::validation(format!("Invalid type: {e}")))?;

    let request = StreamRequest {
        kind,
        tmdb_id,
        season: params.season,
        episode: params.episode,
        options: StreamOptions {
            subtitle_lang: params.subtitle_lang,
            subtitle_url: params.subtitle_url,
        },
        check: params.check,
    };

    Ok(Json(state.metadata_service().stream(request).await?))
}
