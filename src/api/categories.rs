use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, CategoryDto, GenreDto};

/// GET /categories
/// Active categories in display order
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = state.catalog_service().categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

/// GET /genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GenreDto>>, ApiError> {
    let genres = state.catalog_service().genres().await?;
    Ok(Json(genres.into_iter().map(GenreDto::from).collect()))
}
