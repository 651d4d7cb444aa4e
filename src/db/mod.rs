use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{
    CatalogFilter, CatalogSort, ExternalRef, FavoriteTarget, HistoryClear, HistoryQuery, MediaType,
    NewWatchlistItem, PageRequest, RatingInput, RatingQuery, UserId, WatchProgressInput,
    WatchlistQuery,
};
use crate::entities::{
    categories, episodes, favorites, genres, media, movies, ratings, seasons, series,
    watch_history, watchlist,
};

pub mod migrator;
pub mod repositories;
pub mod seed;

pub use repositories::media::NewMedia;
pub use repositories::movie::{MovieRecord, NewMovie};
pub use repositories::series::{
    EpisodeRecord, NewEpisode, NewSeason, NewSeries, SeasonRecord, SeriesRecord,
};
pub use repositories::user::{NewUser, User};
pub use repositories::watch_history::{HistorySummary, WatchTotals};
pub use repositories::{InsertOutcome, Upserted};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn series_repo(&self) -> repositories::series::SeriesRepository {
        repositories::series::SeriesRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::watch_history::WatchHistoryRepository {
        repositories::watch_history::WatchHistoryRepository::new(self.conn.clone())
    }

    // Categories & genres

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.category_repo().list_active().await
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>> {
        self.category_repo().list_genres().await
    }

    pub async fn count_categories(&self) -> Result<u64> {
        self.category_repo().count_categories().await
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        display_order: i32,
    ) -> Result<categories::Model> {
        self.category_repo()
            .create_category(name, description, display_order)
            .await
    }

    pub async fn create_genre(&self, name: &str, description: Option<&str>) -> Result<genres::Model> {
        self.category_repo().create_genre(name, description).await
    }

    // Media

    pub async fn add_media(&self, new: NewMedia) -> Result<media::Model> {
        self.media_repo().add(new).await
    }

    pub async fn set_default_media(&self, media_id: i32) -> Result<Option<media::Model>> {
        self.media_repo().set_default(media_id).await
    }

    pub async fn default_media_for(
        &self,
        kind: crate::domain::MediaParentKind,
        parent_id: i32,
        media_type: crate::domain::AssetType,
    ) -> Result<Vec<media::Model>> {
        self.media_repo()
            .defaults_for(kind, parent_id, media_type)
            .await
    }

    // Movies

    pub async fn list_movies(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<(Vec<MovieRecord>, u64)> {
        self.movie_repo().list(filter, sort, page).await
    }

    pub async fn featured_movies(&self, limit: u64) -> Result<Vec<MovieRecord>> {
        self.movie_repo().featured(limit).await
    }

    pub async fn popular_movies(&self, limit: u64) -> Result<Vec<MovieRecord>> {
        self.movie_repo().popular(limit).await
    }

    pub async fn view_movie(&self, id: i32) -> Result<Option<MovieRecord>> {
        self.movie_repo().get_and_record_view(id).await
    }

    pub async fn related_movies(&self, id: i32, limit: u64) -> Result<Option<Vec<MovieRecord>>> {
        self.movie_repo().related(id, limit).await
    }

    pub async fn get_movies_by_ids(&self, ids: &[i32]) -> Result<Vec<MovieRecord>> {
        self.movie_repo().get_by_ids(ids).await
    }

    pub async fn movie_exists(&self, id: i32) -> Result<bool> {
        self.movie_repo().exists(id).await
    }

    pub async fn set_movie_active(&self, id: i32, active: bool) -> Result<bool> {
        self.movie_repo().set_active(id, active).await
    }

    pub async fn create_movie(&self, new: NewMovie) -> Result<movies::Model> {
        self.movie_repo().create(new).await
    }

    pub async fn attach_movie_genre(&self, movie_id: i32, genre_id: i32) -> Result<()> {
        self.movie_repo().attach_genre(movie_id, genre_id).await
    }

    // Series

    pub async fn list_series(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<(Vec<SeriesRecord>, u64)> {
        self.series_repo().list(filter, sort, page).await
    }

    pub async fn featured_series(&self, limit: u64) -> Result<Vec<SeriesRecord>> {
        self.series_repo().featured(limit).await
    }

    pub async fn popular_series(&self, limit: u64) -> Result<Vec<SeriesRecord>> {
        self.series_repo().popular(limit).await
    }

    pub async fn view_series(&self, id: i32) -> Result<Option<SeriesRecord>> {
        self.series_repo().get_and_record_view(id).await
    }

    pub async fn related_series(&self, id: i32, limit: u64) -> Result<Option<Vec<SeriesRecord>>> {
        self.series_repo().related(id, limit).await
    }

    pub async fn get_series_by_ids(&self, ids: &[i32]) -> Result<Vec<SeriesRecord>> {
        self.series_repo().get_by_ids(ids).await
    }

    pub async fn series_exists(&self, id: i32) -> Result<bool> {
        self.series_repo().exists(id).await
    }

    pub async fn season(&self, series_id: i32, season_id: i32) -> Result<Option<SeasonRecord>> {
        self.series_repo().season(series_id, season_id).await
    }

    pub async fn view_episode(
        &self,
        series_id: i32,
        season_id: i32,
        episode_id: i32,
    ) -> Result<Option<EpisodeRecord>> {
        self.series_repo()
            .episode_and_record_view(series_id, season_id, episode_id)
            .await
    }

    pub async fn set_series_active(&self, id: i32, active: bool) -> Result<bool> {
        self.series_repo().set_active(id, active).await
    }

    pub async fn create_series(&self, new: NewSeries) -> Result<series::Model> {
        self.series_repo().create(new).await
    }

    pub async fn create_season(&self, series_id: i32, new: NewSeason) -> Result<seasons::Model> {
        self.series_repo().create_season(series_id, new).await
    }

    pub async fn create_episode(&self, season_id: i32, new: NewEpisode) -> Result<episodes::Model> {
        self.series_repo().create_episode(season_id, new).await
    }

    pub async fn attach_series_genre(&self, series_id: i32, genre_id: i32) -> Result<()> {
        self.series_repo().attach_genre(series_id, genre_id).await
    }

    // Users

    pub async fn create_user(&self, new: NewUser, config: &SecurityConfig) -> Result<Option<User>> {
        self.user_repo().create(new, config).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_api_key(&self, id: i32) -> Result<String> {
        self.user_repo().regenerate_api_key(id).await
    }

    // Favorites

    pub async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<InsertOutcome<favorites::Model>> {
        self.favorite_repo().add(user_id, target).await
    }

    pub async fn list_favorites(&self, user_id: UserId) -> Result<Vec<favorites::Model>> {
        self.favorite_repo().list(user_id).await
    }

    pub async fn remove_favorite(&self, user_id: UserId, id: i32) -> Result<bool> {
        self.favorite_repo().remove(user_id, id).await
    }

    pub async fn count_favorites(&self, user_id: UserId) -> Result<u64> {
        self.favorite_repo().count(user_id).await
    }

    // Watchlist

    pub async fn add_to_watchlist(
        &self,
        user_id: UserId,
        item: NewWatchlistItem,
    ) -> Result<InsertOutcome<watchlist::Model>> {
        self.watchlist_repo().add(user_id, item).await
    }

    pub async fn find_watchlist_item(
        &self,
        user_id: UserId,
        tmdb_id: i64,
        media_type: MediaType,
    ) -> Result<Option<watchlist::Model>> {
        self.watchlist_repo()
            .find(user_id, tmdb_id, media_type)
            .await
    }

    pub async fn list_watchlist(
        &self,
        user_id: UserId,
        query: &WatchlistQuery,
    ) -> Result<(Vec<watchlist::Model>, u64)> {
        self.watchlist_repo().list(user_id, query).await
    }

    pub async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        id: i32,
    ) -> Result<Option<watchlist::Model>> {
        self.watchlist_repo().remove(user_id, id).await
    }

    pub async fn watchlist_counts_by_type(&self, user_id: UserId) -> Result<Vec<(String, i64)>> {
        self.watchlist_repo().counts_by_type(user_id).await
    }

    pub async fn latest_watchlist_item(&self, user_id: UserId) -> Result<Option<watchlist::Model>> {
        self.watchlist_repo().latest(user_id).await
    }

    pub async fn count_watchlist(&self, user_id: UserId) -> Result<u64> {
        self.watchlist_repo().count(user_id).await
    }

    // Ratings

    pub async fn upsert_rating(
        &self,
        user_id: UserId,
        content: &ExternalRef,
        input: RatingInput,
    ) -> Result<Upserted<ratings::Model>> {
        self.rating_repo().upsert(user_id, content, input).await
    }

    pub async fn find_rating(
        &self,
        user_id: UserId,
        content: &ExternalRef,
    ) -> Result<Option<ratings::Model>> {
        self.rating_repo().find(user_id, content).await
    }

    pub async fn list_ratings(
        &self,
        user_id: UserId,
        query: &RatingQuery,
    ) -> Result<(Vec<ratings::Model>, u64)> {
        self.rating_repo().list(user_id, query).await
    }

    pub async fn delete_rating(&self, user_id: UserId, id: i32) -> Result<Option<ratings::Model>> {
        self.rating_repo().delete(user_id, id).await
    }

    pub async fn rating_distribution(&self, user_id: UserId) -> Result<Vec<(i32, i64)>> {
        self.rating_repo().distribution(user_id).await
    }

    pub async fn latest_rating(&self, user_id: UserId) -> Result<Option<ratings::Model>> {
        self.rating_repo().latest(user_id).await
    }

    pub async fn count_ratings(&self, user_id: UserId) -> Result<u64> {
        self.rating_repo().count(user_id).await
    }

    // Watch history

    pub async fn record_progress(
        &self,
        user_id: UserId,
        content: &ExternalRef,
        input: WatchProgressInput,
    ) -> Result<Upserted<watch_history::Model>> {
        self.history_repo().upsert(user_id, content, input).await
    }

    pub async fn find_progress(
        &self,
        user_id: UserId,
        content: &ExternalRef,
    ) -> Result<Option<watch_history::Model>> {
        self.history_repo().find(user_id, content).await
    }

    pub async fn list_history(
        &self,
        user_id: UserId,
        query: &HistoryQuery,
    ) -> Result<(Vec<watch_history::Model>, u64)> {
        self.history_repo().list(user_id, query).await
    }

    pub async fn continue_watching(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<watch_history::Model>> {
        self.history_repo().continue_watching(user_id, limit).await
    }

    pub async fn clear_history(&self, user_id: UserId, filter: HistoryClear) -> Result<u64> {
        self.history_repo().clear(user_id, filter).await
    }

    pub async fn history_summary(&self, user_id: UserId) -> Result<HistorySummary> {
        self.history_repo().summary(user_id).await
    }

    pub async fn history_by_type(&self, user_id: UserId) -> Result<Vec<(String, WatchTotals)>> {
        self.history_repo().by_type(user_id).await
    }

    pub async fn latest_history_entry(
        &self,
        user_id: UserId,
    ) -> Result<Option<watch_history::Model>> {
        self.history_repo().latest(user_id).await
    }
}
