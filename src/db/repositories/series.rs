use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::category::CategoryRepository;
use super::media::{MediaRepository, MediaScope};
use crate::domain::{
    CatalogFilter, CatalogSort, CatalogSortField, LIKE_ESCAPE, MediaParentKind, PageRequest,
    SeriesStatus, search_text, timestamp_now,
};
use crate::entities::{
    categories, episodes, genres, media, prelude::*, seasons, series, series_genres,
};

#[derive(Debug, Clone)]
pub struct SeriesRecord {
    pub series: series::Model,
    pub category: Option<categories::Model>,
    pub genres: Vec<genres::Model>,
    pub media: Vec<media::Model>,
    /// Only populated on detail reads
    pub seasons: Vec<SeasonRecord>,
}

#[derive(Debug, Clone)]
pub struct SeasonRecord {
    pub season: seasons::Model,
    pub episodes: Vec<episodes::Model>,
    pub media: Vec<media::Model>,
}

#[derive(Debug, Clone)]
pub struct EpisodeRecord {
    pub episode: episodes::Model,
    pub media: Vec<media::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSeries {
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub end_year: Option<i32>,
    pub creator: Option<String>,
    pub cast: Option<String>,
    pub status: SeriesStatus,
    pub rating_avg: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer_url: Option<String>,
    pub maturity_rating: Option<String>,
    pub is_featured: bool,
    pub category_id: i32,
    pub tmdb_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSeason {
    pub season_number: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewEpisode {
    pub episode_number: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub release_date: Option<String>,
}

pub struct SeriesRepository {
    conn: DatabaseConnection,
}

impl SeriesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn active() -> Select<Series> {
        Series::find().filter(series::Column::IsActive.eq(true))
    }

    fn filtered(filter: &CatalogFilter) -> Select<Series> {
        let mut query = Self::active();

        if let Some(category_id) = filter.category_id {
            query = query.filter(series::Column::CategoryId.eq(category_id));
        }

        if let Some(genre_id) = filter.genre_id {
            query = query.filter(
                series::Column::Id.in_subquery(
                    Query::select()
                        .column(series_genres::Column::SeriesId)
                        .from(SeriesGenres)
                        .and_where(series_genres::Column::GenreId.eq(genre_id))
                        .to_owned(),
                ),
            );
        }

        if let Some(pattern) = filter.search_pattern() {
            query = query.filter(
                series::Column::SearchText.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        query
    }

    const fn sort_column(field: CatalogSortField) -> series::Column {
        match field {
            CatalogSortField::CreatedAt | CatalogSortField::Duration => series::Column::CreatedAt,
            CatalogSortField::Title => series::Column::Title,
            CatalogSortField::ReleaseYear => series::Column::ReleaseYear,
            CatalogSortField::ViewCount => series::Column::ViewCount,
            CatalogSortField::RatingAvg => series::Column::RatingAvg,
        }
    }

    pub async fn list(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<(Vec<SeriesRecord>, u64)> {
        let query = Self::filtered(filter);

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count series")?;

        let rows = query
            .order_by(Self::sort_column(sort.field), sort.order.as_order())
            .order_by_asc(series::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list series")?;

        let records = self.hydrate(rows, MediaScope::DefaultPoster).await?;
        Ok((records, total))
    }

    pub async fn featured(&self, limit: u64) -> Result<Vec<SeriesRecord>> {
        let rows = Self::active()
            .filter(series::Column::IsFeatured.eq(true))
            .order_by_desc(series::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<SeriesRecord>> {
        let rows = Self::active()
            .order_by_desc(series::Column::ViewCount)
            .order_by_asc(series::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    /// Increments `view_count` and returns the series with active seasons and episodes.
    pub async fn get_and_record_view(&self, id: i32) -> Result<Option<SeriesRecord>> {
        let updated = Series::update_many()
            .col_expr(
                series::Column::ViewCount,
                Expr::col(series::Column::ViewCount).add(1),
            )
            .filter(series::Column::Id.eq(id))
            .filter(series::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to record series view")?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        let Some(row) = Series::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let Some(mut record) = self.hydrate(vec![row], MediaScope::All).await?.pop() else {
            return Ok(None);
        };

        let season_rows = Seasons::find()
            .filter(seasons::Column::SeriesId.eq(id))
            .filter(seasons::Column::IsActive.eq(true))
            .order_by_asc(seasons::Column::SeasonNumber)
            .all(&self.conn)
            .await?;

        record.seasons = self.hydrate_seasons(season_rows).await?;
        Ok(Some(record))
    }

    /// Active season belonging to `series_id`, with its active episodes.
    pub async fn season(&self, series_id: i32, season_id: i32) -> Result<Option<SeasonRecord>> {
        let Some(season) = self.active_season(series_id, season_id).await? else {
            return Ok(None);
        };

        Ok(self.hydrate_seasons(vec![season]).await?.pop())
    }

    /// Active episode of an active season of `series_id`; records one view.
    pub async fn episode_and_record_view(
        &self,
        series_id: i32,
        season_id: i32,
        episode_id: i32,
    ) -> Result<Option<EpisodeRecord>> {
        if self.active_season(series_id, season_id).await?.is_none() {
            return Ok(None);
        }

        let updated = Episodes::update_many()
            .col_expr(
                episodes::Column::ViewCount,
                Expr::col(episodes::Column::ViewCount).add(1),
            )
            .filter(episodes::Column::Id.eq(episode_id))
            .filter(episodes::Column::SeasonId.eq(season_id))
            .filter(episodes::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to record episode view")?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        let Some(episode) = Episodes::find_by_id(episode_id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut media = MediaRepository::new(self.conn.clone())
            .for_parents(MediaParentKind::Episode, &[episode.id], MediaScope::All)
            .await?;

        Ok(Some(EpisodeRecord {
            media: media.remove(&episode.id).unwrap_or_default(),
            episode,
        }))
    }

    pub async fn related(&self, id: i32, limit: u64) -> Result<Option<Vec<SeriesRecord>>> {
        let Some(source) = Self::active()
            .filter(series::Column::Id.eq(id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let genre_ids: Vec<i32> = SeriesGenres::find()
            .select_only()
            .column(series_genres::Column::GenreId)
            .filter(series_genres::Column::SeriesId.eq(id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut overlap =
            Condition::any().add(series::Column::CategoryId.eq(source.category_id));
        if !genre_ids.is_empty() {
            overlap = overlap.add(
                series::Column::Id.in_subquery(
                    Query::select()
                        .column(series_genres::Column::SeriesId)
                        .from(SeriesGenres)
                        .and_where(series_genres::Column::GenreId.is_in(genre_ids))
                        .to_owned(),
                ),
            );
        }

        let rows = Self::active()
            .filter(series::Column::Id.ne(id))
            .filter(overlap)
            .order_by_desc(series::Column::ViewCount)
            .order_by_asc(series::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(Some(self.hydrate(rows, MediaScope::DefaultPoster).await?))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<SeriesRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Series::find()
            .filter(series::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Series::find_by_id(id).count(&self.conn).await?;
        Ok(count > 0)
    }

    pub async fn set_active(&self, id: i32, active: bool) -> Result<bool> {
        let result = Series::update_many()
            .col_expr(series::Column::IsActive, Expr::value(active))
            .col_expr(series::Column::UpdatedAt, Expr::value(timestamp_now()))
            .filter(series::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create(&self, new: NewSeries) -> Result<series::Model> {
        let now = timestamp_now();
        let model = series::ActiveModel {
            search_text: Set(search_text(&new.title, new.description.as_deref())),
            title: Set(new.title),
            description: Set(new.description),
            release_year: Set(new.release_year),
            end_year: Set(new.end_year),
            creator: Set(new.creator),
            cast: Set(new.cast),
            status: Set(new.status.as_str().to_string()),
            rating_avg: Set(new.rating_avg),
            poster_url: Set(new.poster_url),
            backdrop_url: Set(new.backdrop_url),
            trailer_url: Set(new.trailer_url),
            maturity_rating: Set(new.maturity_rating),
            view_count: Set(0),
            is_active: Set(true),
            is_featured: Set(new.is_featured),
            category_id: Set(new.category_id),
            tmdb_id: Set(new.tmdb_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to create series")?;

        Ok(model)
    }

    pub async fn create_season(&self, series_id: i32, new: NewSeason) -> Result<seasons::Model> {
        let season_number = new.season_number;
        let now = timestamp_now();
        let model = seasons::ActiveModel {
            series_id: Set(series_id),
            season_number: Set(season_number),
            title: Set(new.title),
            description: Set(new.description),
            release_date: Set(new.release_date),
            poster_url: Set(new.poster_url),
            trailer_url: Set(new.trailer_url),
            episode_count: Set(0),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .with_context(|| format!("Failed to create season {season_number}"))?;

        Ok(model)
    }

    /// Inserts the episode and bumps the season's `episode_count` in one transaction.
    pub async fn create_episode(&self, season_id: i32, new: NewEpisode) -> Result<episodes::Model> {
        let txn = self.conn.begin().await?;

        let now = timestamp_now();
        let model = episodes::ActiveModel {
            season_id: Set(season_id),
            episode_number: Set(new.episode_number),
            title: Set(new.title),
            description: Set(new.description),
            duration: Set(new.duration),
            video_url: Set(new.video_url),
            thumbnail_url: Set(new.thumbnail_url),
            release_date: Set(new.release_date),
            view_count: Set(0),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to create episode")?;

        Seasons::update_many()
            .col_expr(
                seasons::Column::EpisodeCount,
                Expr::col(seasons::Column::EpisodeCount).add(1),
            )
            .col_expr(seasons::Column::UpdatedAt, Expr::value(now))
            .filter(seasons::Column::Id.eq(season_id))
            .exec(&txn)
            .await
            .context("Failed to update episode count")?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn attach_genre(&self, series_id: i32, genre_id: i32) -> Result<()> {
        SeriesGenres::insert(series_genres::ActiveModel {
            series_id: Set(series_id),
            genre_id: Set(genre_id),
            ..Default::default()
        })
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                series_genres::Column::SeriesId,
                series_genres::Column::GenreId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.conn)
        .await?;

        Ok(())
    }

    async fn active_season(&self, series_id: i32, season_id: i32) -> Result<Option<seasons::Model>> {
        Ok(Seasons::find_by_id(season_id)
            .filter(seasons::Column::SeriesId.eq(series_id))
            .filter(seasons::Column::IsActive.eq(true))
            .one(&self.conn)
            .await?)
    }

    async fn hydrate_seasons(&self, rows: Vec<seasons::Model>) -> Result<Vec<SeasonRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let season_ids: Vec<i32> = rows.iter().map(|s| s.id).collect();

        let episode_rows = Episodes::find()
            .filter(episodes::Column::SeasonId.is_in(season_ids.clone()))
            .filter(episodes::Column::IsActive.eq(true))
            .order_by_asc(episodes::Column::EpisodeNumber)
            .all(&self.conn)
            .await?;

        let mut media = MediaRepository::new(self.conn.clone())
            .for_parents(MediaParentKind::Season, &season_ids, MediaScope::All)
            .await?;

        let mut by_season: HashMap<i32, Vec<episodes::Model>> = HashMap::new();
        for episode in episode_rows {
            by_season.entry(episode.season_id).or_default().push(episode);
        }

        Ok(rows
            .into_iter()
            .map(|season| SeasonRecord {
                episodes: by_season.remove(&season.id).unwrap_or_default(),
                media: media.remove(&season.id).unwrap_or_default(),
                season,
            })
            .collect())
    }

    async fn genres_for(&self, series_ids: &[i32]) -> Result<HashMap<i32, Vec<genres::Model>>> {
        if series_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = SeriesGenres::find()
            .filter(series_genres::Column::SeriesId.is_in(series_ids.to_vec()))
            .all(&self.conn)
            .await?;

        let genre_ids: Vec<i32> = links.iter().map(|l| l.genre_id).collect();
        let genres = CategoryRepository::new(self.conn.clone())
            .genres_by_ids(&genre_ids)
            .await?;

        let mut grouped: HashMap<i32, Vec<genres::Model>> = HashMap::new();
        for link in links {
            if let Some(genre) = genres.get(&link.genre_id) {
                grouped.entry(link.series_id).or_default().push(genre.clone());
            }
        }
        for list in grouped.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(grouped)
    }

    async fn hydrate(
        &self,
        rows: Vec<series::Model>,
        scope: MediaScope,
    ) -> Result<Vec<SeriesRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|s| s.id).collect();
        let category_ids: Vec<i32> = rows.iter().map(|s| s.category_id).collect();

        let category_repo = CategoryRepository::new(self.conn.clone());
        let media_repo = MediaRepository::new(self.conn.clone());

        let (categories, mut genres, mut media) = futures::try_join!(
            category_repo.by_ids(&category_ids),
            self.genres_for(&ids),
            media_repo.for_parents(MediaParentKind::Series, &ids, scope),
        )?;

        Ok(rows
            .into_iter()
            .map(|series| SeriesRecord {
                category: categories.get(&series.category_id).cloned(),
                genres: genres.remove(&series.id).unwrap_or_default(),
                media: media.remove(&series.id).unwrap_or_default(),
                seasons: Vec::new(),
                series,
            })
            .collect())
    }
}
