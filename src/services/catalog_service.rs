//! Domain service for the local catalog: movies, series and their taxonomy.

use thiserror::Error;

use crate::db::{EpisodeRecord, MovieRecord, SeasonRecord, SeriesRecord};
use crate::domain::{CatalogFilter, CatalogSort, PageRequest};
use crate::entities::{categories, genres, media};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// One page of catalog rows with the total match count.
#[derive(Debug, Clone)]
pub struct CatalogPage<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_movies(
        &self,
        filter: CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<CatalogPage<MovieRecord>, CatalogError>;

    async fn featured_movies(&self, limit: u64) -> Result<Vec<MovieRecord>, CatalogError>;

    async fn popular_movies(&self, limit: u64) -> Result<Vec<MovieRecord>, CatalogError>;

    /// Returns the movie and records one view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the movie is missing or inactive.
    async fn movie(&self, id: i32) -> Result<MovieRecord, CatalogError>;

    async fn related_movies(&self, id: i32, limit: u64) -> Result<Vec<MovieRecord>, CatalogError>;

    async fn list_series(
        &self,
        filter: CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<CatalogPage<SeriesRecord>, CatalogError>;

    async fn featured_series(&self, limit: u64) -> Result<Vec<SeriesRecord>, CatalogError>;

    async fn popular_series(&self, limit: u64) -> Result<Vec<SeriesRecord>, CatalogError>;

    /// Returns the series with its seasons and records one view.
    async fn series(&self, id: i32) -> Result<SeriesRecord, CatalogError>;

    async fn related_series(&self, id: i32, limit: u64)
    -> Result<Vec<SeriesRecord>, CatalogError>;

    async fn season(&self, series_id: i32, season_id: i32) -> Result<SeasonRecord, CatalogError>;

    /// Returns the episode and records one view.
    async fn episode(
        &self,
        series_id: i32,
        season_id: i32,
        episode_id: i32,
    ) -> Result<EpisodeRecord, CatalogError>;

    async fn categories(&self) -> Result<Vec<categories::Model>, CatalogError>;

    async fn genres(&self) -> Result<Vec<genres::Model>, CatalogError>;

    async fn set_movie_active(&self, id: i32, active: bool) -> Result<(), CatalogError>;

    async fn set_series_active(&self, id: i32, active: bool) -> Result<(), CatalogError>;

    /// Makes the asset the only default of its parent and type.
    async fn set_default_media(&self, media_id: i32) -> Result<media::Model, CatalogError>;
}
