use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;

use super::category::CategoryRepository;
use super::media::{MediaRepository, MediaScope};
use crate::domain::{
    CatalogFilter, CatalogSort, CatalogSortField, LIKE_ESCAPE, MediaParentKind, PageRequest,
    search_text, timestamp_now,
};
use crate::entities::{categories, genres, media, movie_genres, movies, prelude::*};

/// Movie row with its category, genres and media.
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub movie: movies::Model,
    pub category: Option<categories::Model>,
    pub genres: Vec<genres::Model>,
    pub media: Vec<media::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub duration: Option<i32>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub rating_avg: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer_url: Option<String>,
    pub video_url: Option<String>,
    pub maturity_rating: Option<String>,
    pub is_featured: bool,
    pub category_id: i32,
    pub tmdb_id: Option<i64>,
    pub imdb_id: Option<String>,
}

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn active() -> Select<Movies> {
        Movies::find().filter(movies::Column::IsActive.eq(true))
    }

    fn filtered(filter: &CatalogFilter) -> Select<Movies> {
        let mut query = Self::active();

        if let Some(category_id) = filter.category_id {
            query = query.filter(movies::Column::CategoryId.eq(category_id));
        }

        // Membership subquery keeps one row per movie, so counts stay distinct.
        if let Some(genre_id) = filter.genre_id {
            query = query.filter(
                movies::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_genres::Column::MovieId)
                        .from(MovieGenres)
                        .and_where(movie_genres::Column::GenreId.eq(genre_id))
                        .to_owned(),
                ),
            );
        }

        if let Some(pattern) = filter.search_pattern() {
            query = query.filter(
                movies::Column::SearchText.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        query
    }

    const fn sort_column(field: CatalogSortField) -> movies::Column {
        match field {
            CatalogSortField::CreatedAt => movies::Column::CreatedAt,
            CatalogSortField::Title => movies::Column::Title,
            CatalogSortField::ReleaseYear => movies::Column::ReleaseYear,
            CatalogSortField::ViewCount => movies::Column::ViewCount,
            CatalogSortField::RatingAvg => movies::Column::RatingAvg,
            CatalogSortField::Duration => movies::Column::Duration,
        }
    }

    /// Returns one page of matching movies and the total match count.
    pub async fn list(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
        page: PageRequest,
    ) -> Result<(Vec<MovieRecord>, u64)> {
        let query = Self::filtered(filter);

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count movies")?;

        let rows = query
            .order_by(Self::sort_column(sort.field), sort.order.as_order())
            .order_by_asc(movies::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list movies")?;

        let records = self.hydrate(rows, MediaScope::DefaultPoster).await?;
        Ok((records, total))
    }

    pub async fn featured(&self, limit: u64) -> Result<Vec<MovieRecord>> {
        let rows = Self::active()
            .filter(movies::Column::IsFeatured.eq(true))
            .order_by_desc(movies::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<MovieRecord>> {
        let rows = Self::active()
            .order_by_desc(movies::Column::ViewCount)
            .order_by_asc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    /// Increments `view_count` by one and returns the updated movie.
    /// `None` when the movie is missing or inactive.
    pub async fn get_and_record_view(&self, id: i32) -> Result<Option<MovieRecord>> {
        let updated = Movies::update_many()
            .col_expr(
                movies::Column::ViewCount,
                Expr::col(movies::Column::ViewCount).add(1),
            )
            .filter(movies::Column::Id.eq(id))
            .filter(movies::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to record movie view")?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        let Some(movie) = Movies::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![movie], MediaScope::All).await?.pop())
    }

    /// Active movies sharing the category or a genre, most viewed first.
    /// `None` when the source movie does not exist.
    pub async fn related(&self, id: i32, limit: u64) -> Result<Option<Vec<MovieRecord>>> {
        let Some(source) = Self::active()
            .filter(movies::Column::Id.eq(id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let genre_ids: Vec<i32> = MovieGenres::find()
            .select_only()
            .column(movie_genres::Column::GenreId)
            .filter(movie_genres::Column::MovieId.eq(id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut overlap =
            Condition::any().add(movies::Column::CategoryId.eq(source.category_id));
        if !genre_ids.is_empty() {
            overlap = overlap.add(
                movies::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_genres::Column::MovieId)
                        .from(MovieGenres)
                        .and_where(movie_genres::Column::GenreId.is_in(genre_ids))
                        .to_owned(),
                ),
            );
        }

        let rows = Self::active()
            .filter(movies::Column::Id.ne(id))
            .filter(overlap)
            .order_by_desc(movies::Column::ViewCount)
            .order_by_asc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(Some(self.hydrate(rows, MediaScope::DefaultPoster).await?))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<MovieRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Movies::find()
            .filter(movies::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;

        self.hydrate(rows, MediaScope::DefaultPoster).await
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Movies::find_by_id(id).count(&self.conn).await?;
        Ok(count > 0)
    }

    /// Soft activation toggle; returns false when the movie does not exist.
    pub async fn set_active(&self, id: i32, active: bool) -> Result<bool> {
        let result = Movies::update_many()
            .col_expr(movies::Column::IsActive, Expr::value(active))
            .col_expr(movies::Column::UpdatedAt, Expr::value(timestamp_now()))
            .filter(movies::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create(&self, new: NewMovie) -> Result<movies::Model> {
        let now = timestamp_now();
        let model = movies::ActiveModel {
            search_text: Set(search_text(&new.title, new.description.as_deref())),
            title: Set(new.title),
            description: Set(new.description),
            release_year: Set(new.release_year),
            duration: Set(new.duration),
            director: Set(new.director),
            cast: Set(new.cast),
            rating_avg: Set(new.rating_avg),
            poster_url: Set(new.poster_url),
            backdrop_url: Set(new.backdrop_url),
            trailer_url: Set(new.trailer_url),
            video_url: Set(new.video_url),
            maturity_rating: Set(new.maturity_rating),
            view_count: Set(0),
            is_active: Set(true),
            is_featured: Set(new.is_featured),
            category_id: Set(new.category_id),
            tmdb_id: Set(new.tmdb_id),
            imdb_id: Set(new.imdb_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to create movie")?;

        Ok(model)
    }

    pub async fn attach_genre(&self, movie_id: i32, genre_id: i32) -> Result<()> {
        MovieGenres::insert(movie_genres::ActiveModel {
            movie_id: Set(movie_id),
            genre_id: Set(genre_id),
            ..Default::default()
        })
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                movie_genres::Column::MovieId,
                movie_genres::Column::GenreId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.conn)
        .await?;

        Ok(())
    }

    async fn genres_for(&self, movie_ids: &[i32]) -> Result<HashMap<i32, Vec<genres::Model>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = MovieGenres::find()
            .filter(movie_genres::Column::MovieId.is_in(movie_ids.to_vec()))
            .all(&self.conn)
            .await?;

        let genre_ids: Vec<i32> = links.iter().map(|l| l.genre_id).collect();
        let genres = CategoryRepository::new(self.conn.clone())
            .genres_by_ids(&genre_ids)
            .await?;

        let mut grouped: HashMap<i32, Vec<genres::Model>> = HashMap::new();
        for link in links {
            if let Some(genre) = genres.get(&link.genre_id) {
                grouped.entry(link.movie_id).or_default().push(genre.clone());
            }
        }
        for list in grouped.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(grouped)
    }

    /// Batch-loads relations for a page of rows, preserving row order.
    async fn hydrate(
        &self,
        rows: Vec<movies::Model>,
        scope: MediaScope,
    ) -> Result<Vec<MovieRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
        let category_ids: Vec<i32> = rows.iter().map(|m| m.category_id).collect();

        let category_repo = CategoryRepository::new(self.conn.clone());
        let media_repo = MediaRepository::new(self.conn.clone());

        let (categories, mut genres, mut media) = futures::try_join!(
            category_repo.by_ids(&category_ids),
            self.genres_for(&ids),
            media_repo.for_parents(MediaParentKind::Movie, &ids, scope),
        )?;

        Ok(rows
            .into_iter()
            .map(|movie| MovieRecord {
                category: categories.get(&movie.category_id).cloned(),
                genres: genres.remove(&movie.id).unwrap_or_default(),
                media: media.remove(&movie.id).unwrap_or_default(),
                movie,
            })
            .collect())
    }
}
