use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{
    ApiError, AppState, CatalogListQuery, EpisodeDto, LimitQuery, ListResponse, SeasonDto,
    SeriesDto,
};

const FEATURED_LIMIT: u64 = 10;
const POPULAR_LIMIT: u64 = 10;
const RELATED_LIMIT: u64 = 6;

/// GET /series
pub async fn list_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<ListResponse<SeriesDto>>, ApiError> {
    let page = state
        .catalog_service()
        .list_series(query.filter(), query.sort(false), query.page())
        .await?;
    Ok(Json(page.into()))
}

/// GET /series/featured
pub async fn featured_series(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SeriesDto>>, ApiError> {
    let series = state.catalog_service().featured_series(FEATURED_LIMIT).await?;
    Ok(Json(series.into_iter().map(SeriesDto::from).collect()))
}

/// GET /series/popular
pub async fn popular_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<SeriesDto>>, ApiError> {
    let series = state
        .catalog_service()
        .popular_series(query.limit_or(POPULAR_LIMIT))
        .await?;
    Ok(Json(series.into_iter().map(SeriesDto::from).collect()))
}

/// GET /series/{id}
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SeriesDto>, ApiError> {
    let id = validate_id(id, "series")?;
    Ok(Json(state.catalog_service().series(id).await?.into()))
}

/// GET /series/{id}/related
pub async fn related_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<SeriesDto>>, ApiError> {
    let id = validate_id(id, "series")?;
    let series = state
        .catalog_service()
        .related_series(id, query.limit_or(RELATED_LIMIT))
        .await?;
    Ok(Json(series.into_iter().map(SeriesDto::from).collect()))
}

/// GET /series/{series_id}/seasons/{season_id}
pub async fn get_season(
    State(state): State<Arc<AppState>>,
    Path((series_id, season_id)): Path<(i32, i32)>,
) -> Result<Json<SeasonDto>, ApiError> {
    let series_id = validate_id(series_id, "series")?;
    let season_id = validate_id(season_id, "season")?;
    let season = state.catalog_service().season(series_id, season_id).await?;
    Ok(Json(season.into()))
}

/// GET /series/{series_id}/seasons/{season_id}/episodes/{episode_id}
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path((series_id, season_id, episode_id)): Path<(i32, i32, i32)>,
) -> Result<Json<EpisodeDto>, ApiError> {
    let series_id = validate_id(series_id, "series")?;
    let season_id = validate_id(season_id, "season")?;
    let episode_id = validate_id(episode_id, "episode")?;
    let episode = state
        .catalog_service()
        .episode(series_id, season_id, episode_id)
        .await?;
    Ok(Json(episode.into()))
}
