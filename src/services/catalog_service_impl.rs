//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{EpisodeRecord, MovieRecord, SeasonRecord, SeriesRecord, Store};
use crate::domain::{CatalogFilter, CatalogSort, PageRequest};
use crate::entities::{categories, genres, media};
use crate::services::catalog_service::{CatalogError, CatalogPage, CatalogService};

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn movie_not_found() -> CatalogError {
    CatalogError::NotFound("Movie not found".to_string())
}

fn series_not_found() -> CatalogError {
    CatalogError::NotFound("Series not found".to_string())
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_movies(
        &self,
        filter: CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<CatalogPage<MovieRecord>, CatalogError> {
        let (rows, total) = self.store.list_movies(&filter, sort, page).await?;
        Ok(CatalogPage {
            rows,
            total,
            request: page,
        })
    }

    async fn featured_movies(&self, limit: u64) -> Result<Vec<MovieRecord>, CatalogError> {
        Ok(self.store.featured_movies(limit).await?)
    }

    async fn popular_movies(&self, limit: u64) -> Result<Vec<MovieRecord>, CatalogError> {
        Ok(self.store.popular_movies(limit).await?)
    }

    async fn movie(&self, id: i32) -> Result<MovieRecord, CatalogError> {
        self.store.view_movie(id).await?.ok_or_else(movie_not_found)
    }

    async fn related_movies(&self, id: i32, limit: u64) -> Result<Vec<MovieRecord>, CatalogError> {
        self.store
            .related_movies(id, limit)
            .await?
            .ok_or_else(movie_not_found)
    }

    async fn list_series(
        &self,
        filter: CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<CatalogPage<SeriesRecord>, CatalogError> {
        let (rows, total) = self.store.list_series(&filter, sort, page).await?;
        Ok(CatalogPage {
            rows,
            total,
            request: page,
        })
    }

    async fn featured_series(&self, limit: u64) -> Result<Vec<SeriesRecord>, CatalogError> {
        Ok(self.store.featured_series(limit).await?)
    }

    async fn popular_series(&self, limit: u64) -> Result<Vec<SeriesRecord>, CatalogError> {
        Ok(self.store.popular_series(limit).await?)
    }

    async fn series(&self, id: i32) -> Result<SeriesRecord, CatalogError> {
        self.store.view_series(id).await?.ok_or_else(series_not_found)
    }

    async fn related_series(
        &self,
        id: i32,
        limit: u64,
    ) -> Result<Vec<SeriesRecord>, CatalogError> {
        self.store
            .related_series(id, limit)
            .await?
            .ok_or_else(series_not_found)
    }

    async fn season(&self, series_id: i32, season_id: i32) -> Result<SeasonRecord, CatalogError> {
        self.store
            .season(series_id, season_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound("Season not found".to_string()))
    }

    async fn episode(
        &self,
        series_id: i32,
        season_id: i32,
        episode_id: i32,
    ) -> Result<EpisodeRecord, CatalogError> {
        self.store
            .view_episode(series_id, season_id, episode_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound("Episode not found".to_string()))
    }

    async fn categories(&self) -> Result<Vec<categories::Model>, CatalogError> {
        Ok(self.store.list_categories().await?)
    }

    async fn genres(&self) -> Result<Vec<genres::Model>, CatalogError> {
        Ok(self.store.list_genres().await?)
    }

    async fn set_movie_active(&self, id: i32, active: bool) -> Result<(), CatalogError> {
        if !self.store.set_movie_active(id, active).await? {
            return Err(movie_not_found());
        }
        info!(movie_id = id, active, "Movie activation changed");
        Ok(())
    }

    async fn set_series_active(&self, id: i32, active: bool) -> Result<(), CatalogError> {
        if !self.store.set_series_active(id, active).await? {
            return Err(series_not_found());
        }
        info!(series_id = id, active, "Series activation changed");
        Ok(())
    }

    async fn set_default_media(&self, media_id: i32) -> Result<media::Model, CatalogError> {
        let media = self
            .store
            .set_default_media(media_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound("Media not found".to_string()))?;

        info!(
            media_id,
            parent_kind = %media.parent_kind,
            parent_id = media.parent_id,
            "Default media changed"
        );
        Ok(media)
    }
}
