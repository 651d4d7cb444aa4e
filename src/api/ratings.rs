use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::{external_ref, parse_optional, validate_id};
use super::{ApiError, AppState};
use crate::domain::{CurrentUser, ListSort, PageRequest, RatingInput, RatingQuery};
use crate::services::user_content_service::{RatingView, RatingsPage, UpsertAction};

const DEFAULT_LIMIT: u64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub tmdb_id: Option<i64>,
    pub media_type: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    /// Parsed as a number so fractional scores are rejected with 400
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingListQuery {
    pub media_type: Option<String>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    pub tmdb_id: Option<i64>,
    pub media_type: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: &'static str,
    pub rating: RatingView,
    pub action: UpsertAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingResponse {
    pub rating: Option<RatingView>,
    pub has_rating: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRating {
    pub id: i32,
    pub title: String,
    pub rating: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRatingResponse {
    pub message: &'static str,
    pub deleted_rating: DeletedRating,
}

fn whole_score(value: f64) -> Result<i32, ApiError> {
    if value.fract() != 0.0 || !(1.0..=10.0).contains(&value) {
        return Err(ApiError::validation(
            "rating must be an integer between 1 and 10",
        ));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(value as i32)
}

/// POST /user/ratings
/// 201 on first rating, 200 when overwriting
pub async fn upsert_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<RatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(rating), Some(title)) = (payload.rating, payload.title) else {
        return Err(ApiError::validation(
            "tmdbId, mediaType, rating and title are required",
        ));
    };
    let content = external_ref(
        payload.tmdb_id,
        payload.media_type.as_deref(),
        payload.season_number,
        payload.episode_number,
    )?;

    let saved = state
        .user_content_service()
        .upsert_rating(
            user.id,
            content,
            RatingInput {
                rating: whole_score(rating)?,
                comment: payload.comment,
                title,
            },
        )
        .await?;

    let (status, message) = match saved.action {
        UpsertAction::Created => (StatusCode::CREATED, "Rating added"),
        UpsertAction::Updated => (StatusCode::OK, "Rating updated"),
    };

    Ok((
        status,
        Json(RatingResponse {
            message,
            rating: saved.rating,
            action: saved.action,
        }),
    ))
}

/// GET /user/ratings
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<RatingListQuery>,
) -> Result<Json<RatingsPage>, ApiError> {
    let query = RatingQuery {
        media_type: parse_optional(params.media_type.as_deref(), "mediaType")?,
        min_rating: params.min_rating,
        max_rating: params.max_rating,
        sort: ListSort::parse(params.sort_by.as_deref(), params.order.as_deref()),
        page: PageRequest::new(params.limit, None, params.page, DEFAULT_LIMIT),
    };

    Ok(Json(
        state.user_content_service().ratings(user.id, query).await?,
    ))
}

/// GET /user/rating
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ContentQuery>,
) -> Result<Json<UserRatingResponse>, ApiError> {
    let content = external_ref(
        params.tmdb_id,
        params.media_type.as_deref(),
        params.season_number,
        params.episode_number,
    )?;

    let rating = state
        .user_content_service()
        .rating(user.id, content)
        .await?;

    Ok(Json(UserRatingResponse {
        has_rating: rating.is_some(),
        rating,
    }))
}

/// DELETE /user/ratings/{id}
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteRatingResponse>, ApiError> {
    let id = validate_id(id, "rating")?;
    let removed = state
        .user_content_service()
        .delete_rating(user.id, id)
        .await?;

    Ok(Json(DeleteRatingResponse {
        message: "Rating removed",
        deleted_rating: DeletedRating {
            id: removed.id,
            title: removed.title,
            rating: removed.rating,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_score() {
        assert_eq!(whole_score(1.0).unwrap(), 1);
        assert_eq!(whole_score(10.0).unwrap(), 10);
        assert!(whole_score(0.0).is_err());
        assert!(whole_score(11.0).is_err());
        assert!(whole_score(7.5).is_err());
        assert!(whole_score(f64::NAN).is_err());
    }
}
