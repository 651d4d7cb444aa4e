use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, AppState, CatalogListQuery, LimitQuery, ListResponse, MovieDto};

const FEATURED_LIMIT: u64 = 10;
const POPULAR_LIMIT: u64 = 10;
const RELATED_LIMIT: u64 = 6;

/// GET /movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<ListResponse<MovieDto>>, ApiError> {
    let page = state
        .catalog_service()
        .list_movies(query.filter(), query.sort(true), query.page())
        .await?;
    Ok(Json(page.into()))
}

/// GET /movies/featured
pub async fn featured_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MovieDto>>, ApiError> {
    let movies = state.catalog_service().featured_movies(FEATURED_LIMIT).await?;
    Ok(Json(movies.into_iter().map(MovieDto::from).collect()))
}

/// GET /movies/popular
pub async fn popular_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<MovieDto>>, ApiError> {
    let movies = state
        .catalog_service()
        .popular_movies(query.limit_or(POPULAR_LIMIT))
        .await?;
    Ok(Json(movies.into_iter().map(MovieDto::from).collect()))
}

/// GET /movies/{id}
/// Every successful read counts as one view
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<MovieDto>, ApiError> {
    let id = validate_id(id, "movie")?;
    let movie = state.catalog_service().movie(id).await?;
    Ok(Json(movie.into()))
}

/// GET /movies/{id}/related
pub async fn related_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<MovieDto>>, ApiError> {
    let id = validate_id(id, "movie")?;
    let movies = state
        .catalog_service()
        .related_movies(id, query.limit_or(RELATED_LIMIT))
        .await?;
    Ok(Json(movies.into_iter().map(MovieDto::from).collect()))
}
