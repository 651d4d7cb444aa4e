//! Domain service for per-user favorites, watchlist, ratings and history.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::image::ImageUrls;
use crate::db::{MovieRecord, SeriesRecord};
use crate::domain::user_content::{progress_percentage, remaining_seconds};
use crate::domain::{
    ExternalRef, FavoriteTarget, HistoryClear, HistoryQuery, MediaType, NewWatchlistItem,
    Pagination, RatingInput, RatingQuery, UserId, WatchProgressInput, WatchlistQuery, days_since,
};
use crate::entities::{favorites, ratings, watch_history, watchlist};

#[derive(Debug, Error)]
pub enum UserContentError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// `existing` carries the stored row when the client may want it
    #[error("{message}")]
    Conflict {
        message: String,
        existing: Option<Value>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserContentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Whether an upsert inserted a new row or overwrote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    #[must_use]
    pub const fn from_created(created: bool) -> Self {
        if created { Self::Created } else { Self::Updated }
    }
}

/// A favorite joined with the catalog entry it points at.
#[derive(Debug, Clone)]
pub struct FavoriteEntry {
    pub favorite: favorites::Model,
    pub movie: Option<MovieRecord>,
    pub series: Option<SeriesRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItemView {
    pub id: i32,
    pub tmdb_id: i64,
    pub media_type: String,
    pub title: String,
    pub poster_path: Option<String>,
    pub added_at: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "poster_url")]
    pub poster_url: Option<String>,
    #[serde(rename = "added_days_ago")]
    pub added_days_ago: Option<i64>,
}

impl WatchlistItemView {
    #[must_use]
    pub fn new(model: watchlist::Model, images: &ImageUrls) -> Self {
        Self {
            poster_url: images.poster(model.poster_path.as_deref()),
            added_days_ago: days_since(&model.added_at),
            id: model.id,
            tmdb_id: model.tmdb_id,
            media_type: model.media_type,
            title: model.title,
            poster_path: model.poster_path,
            added_at: model.added_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    pub total_movies: i64,
    #[serde(rename = "totalTV")]
    pub total_tv: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistPage {
    pub items: Vec<WatchlistItemView>,
    pub pagination: Pagination,
    pub stats: WatchlistStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    pub id: i32,
    pub tmdb_id: i64,
    pub media_type: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub rating: i32,
    pub comment: Option<String>,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ratings::Model> for RatingView {
    fn from(model: ratings::Model) -> Self {
        Self {
            id: model.id,
            tmdb_id: model.tmdb_id,
            media_type: model.media_type,
            season_number: model.season_number,
            episode_number: model.episode_number,
            rating: model.rating,
            comment: model.comment,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingUpsert {
    pub rating: RatingView,
    pub action: UpsertAction,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    /// One decimal; 0 when nothing is rated
    pub average_rating: f64,
    pub total_ratings: i64,
    pub rating_distribution: Vec<RatingBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingsPage {
    pub ratings: Vec<RatingView>,
    pub pagination: Pagination,
    pub stats: RatingStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryView {
    pub id: i32,
    pub tmdb_id: i64,
    pub media_type: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub title: String,
    pub poster_path: Option<String>,
    pub progress: i32,
    pub duration: Option<i32>,
    pub completed: bool,
    pub watched_at: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "poster_url")]
    pub poster_url: Option<String>,
    pub progress_percentage: i64,
    #[serde(rename = "watched_days_ago")]
    pub watched_days_ago: Option<i64>,
    #[serde(rename = "remaining_time")]
    pub remaining_time: i64,
}

impl WatchHistoryView {
    #[must_use]
    pub fn new(model: watch_history::Model, images: &ImageUrls) -> Self {
        Self {
            poster_url: images.poster(model.poster_path.as_deref()),
            progress_percentage: progress_percentage(model.progress, model.duration),
            watched_days_ago: days_since(&model.watched_at),
            remaining_time: remaining_seconds(model.progress, model.duration, model.completed),
            id: model.id,
            tmdb_id: model.tmdb_id,
            media_type: model.media_type,
            season_number: model.season_number,
            episode_number: model.episode_number,
            title: model.title,
            poster_path: model.poster_path,
            progress: model.progress,
            duration: model.duration,
            completed: model.completed,
            watched_at: model.watched_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryUpsert {
    #[serde(rename = "watchHistory")]
    pub watch_history: WatchHistoryView,
    pub action: UpsertAction,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_watched: i64,
    pub completed_count: i64,
    pub in_progress_count: i64,
    pub total_watch_time: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub items: Vec<WatchHistoryView>,
    pub pagination: Pagination,
    pub stats: HistoryStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub progress: i32,
    pub duration: Option<i32>,
    pub completed: bool,
    pub progress_percentage: i64,
    pub last_watched_at: String,
    pub remaining_time: i64,
}

impl From<watch_history::Model> for ProgressView {
    fn from(model: watch_history::Model) -> Self {
        Self {
            progress: model.progress,
            duration: model.duration,
            completed: model.completed,
            progress_percentage: progress_percentage(model.progress, model.duration),
            remaining_time: remaining_seconds(model.progress, model.duration, model.completed),
            last_watched_at: model.watched_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    pub watchlist_items: u64,
    pub favorites: u64,
    pub ratings_given: u64,
    pub items_watched: i64,
    pub total_watch_time_seconds: i64,
    pub total_watch_time_hours: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotals {
    pub count: i64,
    pub total_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentWatchlistAddition {
    pub title: String,
    pub media_type: String,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentWatch {
    pub title: String,
    pub media_type: String,
    pub watched_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRating {
    pub title: String,
    pub rating: i32,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub last_watchlist_addition: Option<RecentWatchlistAddition>,
    pub last_watched: Option<RecentWatch>,
    pub last_rating: Option<RecentRating>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub general: GeneralStats,
    pub watchlist: BTreeMap<String, i64>,
    pub watch_history: BTreeMap<String, TypeTotals>,
    pub recent_activity: RecentActivity,
}

/// Weighted mean of a `(score, count)` distribution, rounded to one decimal.
#[must_use]
pub fn average_rating(distribution: &[(i32, i64)]) -> f64 {
    let (sum, count) = distribution
        .iter()
        .fold((0i64, 0i64), |(sum, count), (score, n)| {
            (sum + i64::from(*score) * n, count + n)
        });

    if count == 0 {
        return 0.0;
    }

    let mean = sum as f64 / count as f64;
    (mean * 10.0).round() / 10.0
}

#[async_trait::async_trait]
pub trait UserContentService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`UserContentError::NotFound`] when the catalog entry is missing and
    /// [`UserContentError::Conflict`] when it is already a favorite.
    async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<FavoriteEntry, UserContentError>;

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteEntry>, UserContentError>;

    async fn remove_favorite(&self, user_id: UserId, id: i32) -> Result<(), UserContentError>;

    async fn add_to_watchlist(
        &self,
        user_id: UserId,
        item: NewWatchlistItem,
    ) -> Result<WatchlistItemView, UserContentError>;

    /// Returns the removed row.
    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        id: i32,
    ) -> Result<watchlist::Model, UserContentError>;

    async fn watchlist(
        &self,
        user_id: UserId,
        query: WatchlistQuery,
    ) -> Result<WatchlistPage, UserContentError>;

    async fn check_watchlist(
        &self,
        user_id: UserId,
        tmdb_id: i64,
        media_type: MediaType,
    ) -> Result<Option<watchlist::Model>, UserContentError>;

    /// # Errors
    ///
    /// Returns [`UserContentError::Validation`] for a score outside 1..=10 or an empty title.
    async fn upsert_rating(
        &self,
        user_id: UserId,
        content: ExternalRef,
        input: RatingInput,
    ) -> Result<RatingUpsert, UserContentError>;

    async fn ratings(
        &self,
        user_id: UserId,
        query: RatingQuery,
    ) -> Result<RatingsPage, UserContentError>;

    async fn rating(
        &self,
        user_id: UserId,
        content: ExternalRef,
    ) -> Result<Option<RatingView>, UserContentError>;

    async fn delete_rating(&self, user_id: UserId, id: i32) -> Result<RatingView, UserContentError>;

    async fn record_progress(
        &self,
        user_id: UserId,
        content: ExternalRef,
        input: WatchProgressInput,
    ) -> Result<HistoryUpsert, UserContentError>;

    async fn history(
        &self,
        user_id: UserId,
        query: HistoryQuery,
    ) -> Result<HistoryPage, UserContentError>;

    async fn progress(
        &self,
        user_id: UserId,
        content: ExternalRef,
    ) -> Result<Option<ProgressView>, UserContentError>;

    async fn continue_watching(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<WatchHistoryView>, UserContentError>;

    /// Bulk delete, returns the number of removed rows.
    async fn clear_history(
        &self,
        user_id: UserId,
        filter: HistoryClear,
    ) -> Result<u64, UserContentError>;

    /// Aggregates computed from live storage on every call.
    async fn stats(&self, user_id: UserId) -> Result<UserStats, UserContentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert!((average_rating(&[]) - 0.0).abs() < f64::EPSILON);
        assert!((average_rating(&[(7, 1), (9, 1)]) - 8.0).abs() < f64::EPSILON);
        assert!((average_rating(&[(7, 2), (8, 1)]) - 7.3).abs() < 1e-9);
    }

    #[test]
    fn test_upsert_action_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(UpsertAction::from_created(true)).unwrap(),
            "created"
        );
        assert_eq!(
            serde_json::to_value(UpsertAction::from_created(false)).unwrap(),
            "updated"
        );
    }

    #[test]
    fn test_watchlist_view_keeps_derived_field_names() {
        let images = ImageUrls::new("https://image.tmdb.org/t/p");
        let view = WatchlistItemView::new(
            watchlist::Model {
                id: 1,
                user_id: 1,
                tmdb_id: 27205,
                media_type: "movie".to_string(),
                title: "Inception".to_string(),
                poster_path: Some("/p.jpg".to_string()),
                added_at: "2024-01-01T00:00:00.000000Z".to_string(),
                created_at: "2024-01-01T00:00:00.000000Z".to_string(),
                updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            },
            &images,
        );

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tmdbId"], 27205);
        assert_eq!(json["poster_url"], "https://image.tmdb.org/t/p/w500/p.jpg");
        assert!(json["added_days_ago"].as_i64().unwrap() > 0);
    }
}
