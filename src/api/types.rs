use serde::{Deserialize, Serialize};

use crate::db::{EpisodeRecord, MovieRecord, SeasonRecord, SeriesRecord};
use crate::domain::{AssetType, CatalogFilter, CatalogSort, PageRequest, Pagination};
use crate::entities::{categories, episodes, favorites, genres, media};
use crate::services::CatalogPage;
use crate::services::user_content_service::FavoriteEntry;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query shared by the movie and series listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListQuery {
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub page: Option<u64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl CatalogListQuery {
    pub const DEFAULT_LIMIT: u64 = 20;

    #[must_use]
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            category_id: self.category_id,
            genre_id: self.genre_id,
            search: self.search.clone(),
        }
    }

    #[must_use]
    pub fn sort(&self, supports_duration: bool) -> CatalogSort {
        CatalogSort::parse(
            self.sort_by.as_deref(),
            self.order.as_deref(),
            supports_duration,
        )
    }

    #[must_use]
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset, self.page, Self::DEFAULT_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

impl LimitQuery {
    #[must_use]
    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, PageRequest::MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

impl<R, T: From<R>> From<CatalogPage<R>> for ListResponse<T> {
    fn from(page: CatalogPage<R>) -> Self {
        Self {
            pagination: Pagination::new(page.total, page.request),
            rows: page.rows.into_iter().map(T::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
}

impl From<categories::Model> for CategoryDto {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
            is_active: model.is_active,
            display_order: model.display_order,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<genres::Model> for GenreDto {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id: i32,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_default: bool,
}

impl From<media::Model> for MediaDto {
    fn from(model: media::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            media_type: model.media_type,
            title: model.title,
            description: model.description,
            is_default: model.is_default,
        }
    }
}

/// Full admin view of a media row, including its parent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetDto {
    #[serde(flatten)]
    pub media: MediaDto,
    pub parent_kind: String,
    pub parent_id: i32,
}

impl From<media::Model> for MediaAssetDto {
    fn from(model: media::Model) -> Self {
        Self {
            parent_kind: model.parent_kind.clone(),
            parent_id: model.parent_id,
            media: model.into(),
        }
    }
}

/// URL of the default asset of `kind`, else the first one of that kind.
fn asset_url(assets: &[media::Model], kind: AssetType) -> Option<String> {
    let mut of_kind = assets.iter().filter(|m| m.media_type == kind.as_str());
    let first = of_kind.clone().next();
    of_kind
        .find(|m| m.is_default)
        .or(first)
        .map(|m| m.url.clone())
}

fn media_dtos(assets: Vec<media::Model>) -> Vec<MediaDto> {
    assets.into_iter().map(MediaDto::from).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub duration: Option<i32>,
    pub director: Option<String>,
    pub cast: Option<String>,
    #[serde(rename = "ratingAVG")]
    pub rating_avg: f64,
    pub view_count: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub maturity_rating: Option<String>,
    pub category_id: i32,
    pub tmdb_id: Option<i64>,
    pub imdb_id: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub category: Option<CategoryDto>,
    pub genres: Vec<GenreDto>,
    pub media: Vec<MediaDto>,
}

impl From<MovieRecord> for MovieDto {
    fn from(record: MovieRecord) -> Self {
        let movie = record.movie;
        Self {
            poster_url: asset_url(&record.media, AssetType::Poster).or(movie.poster_url),
            backdrop_url: asset_url(&record.media, AssetType::Backdrop).or(movie.backdrop_url),
            trailer_url: asset_url(&record.media, AssetType::Trailer).or(movie.trailer_url),
            video_url: asset_url(&record.media, AssetType::Video).or(movie.video_url),
            id: movie.id,
            title: movie.title,
            description: movie.description,
            release_year: movie.release_year,
            duration: movie.duration,
            director: movie.director,
            cast: movie.cast,
            rating_avg: movie.rating_avg,
            view_count: movie.view_count,
            is_active: movie.is_active,
            is_featured: movie.is_featured,
            maturity_rating: movie.maturity_rating,
            category_id: movie.category_id,
            tmdb_id: movie.tmdb_id,
            imdb_id: movie.imdb_id,
            created_at: movie.created_at,
            updated_at: movie.updated_at,
            category: record.category.map(CategoryDto::from),
            genres: record.genres.into_iter().map(GenreDto::from).collect(),
            media: media_dtos(record.media),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDto {
    pub id: i32,
    pub season_id: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub release_date: Option<String>,
    pub view_count: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaDto>,
}

impl From<episodes::Model> for EpisodeDto {
    fn from(episode: episodes::Model) -> Self {
        Self {
            id: episode.id,
            season_id: episode.season_id,
            episode_number: episode.episode_number,
            title: episode.title,
            description: episode.description,
            duration: episode.duration,
            video_url: episode.video_url,
            thumbnail_url: episode.thumbnail_url,
            release_date: episode.release_date,
            view_count: episode.view_count,
            is_active: episode.is_active,
            media: Vec::new(),
        }
    }
}

impl From<EpisodeRecord> for EpisodeDto {
    fn from(record: EpisodeRecord) -> Self {
        let thumbnail_url = asset_url(&record.media, AssetType::Thumbnail);
        let video_url = asset_url(&record.media, AssetType::Video);
        let base = Self::from(record.episode);
        Self {
            thumbnail_url: thumbnail_url.or(base.thumbnail_url),
            video_url: video_url.or(base.video_url),
            media: media_dtos(record.media),
            ..base
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDto {
    pub id: i32,
    pub series_id: i32,
    pub season_number: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub is_active: bool,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub episode_count: i32,
    pub episodes: Vec<EpisodeDto>,
    pub media: Vec<MediaDto>,
}

impl From<SeasonRecord> for SeasonDto {
    fn from(record: SeasonRecord) -> Self {
        let season = record.season;
        Self {
            poster_url: asset_url(&record.media, AssetType::Poster).or(season.poster_url),
            trailer_url: asset_url(&record.media, AssetType::Trailer).or(season.trailer_url),
            episode_count: season.episode_count,
            id: season.id,
            series_id: season.series_id,
            season_number: season.season_number,
            title: season.title,
            description: season.description,
            release_date: season.release_date,
            is_active: season.is_active,
            episodes: record.episodes.into_iter().map(EpisodeDto::from).collect(),
            media: media_dtos(record.media),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub end_year: Option<i32>,
    pub creator: Option<String>,
    pub cast: Option<String>,
    pub status: String,
    #[serde(rename = "ratingAVG")]
    pub rating_avg: f64,
    pub view_count: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub maturity_rating: Option<String>,
    pub category_id: i32,
    pub tmdb_id: Option<i64>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub category: Option<CategoryDto>,
    pub genres: Vec<GenreDto>,
    pub media: Vec<MediaDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<SeasonDto>,
}

impl From<SeriesRecord> for SeriesDto {
    fn from(record: SeriesRecord) -> Self {
        let series = record.series;
        Self {
            poster_url: asset_url(&record.media, AssetType::Poster).or(series.poster_url),
            backdrop_url: asset_url(&record.media, AssetType::Backdrop).or(series.backdrop_url),
            trailer_url: asset_url(&record.media, AssetType::Trailer).or(series.trailer_url),
            id: series.id,
            title: series.title,
            description: series.description,
            release_year: series.release_year,
            end_year: series.end_year,
            creator: series.creator,
            cast: series.cast,
            status: series.status,
            rating_avg: series.rating_avg,
            view_count: series.view_count,
            is_active: series.is_active,
            is_featured: series.is_featured,
            maturity_rating: series.maturity_rating,
            category_id: series.category_id,
            tmdb_id: series.tmdb_id,
            created_at: series.created_at,
            updated_at: series.updated_at,
            category: record.category.map(CategoryDto::from),
            genres: record.genres.into_iter().map(GenreDto::from).collect(),
            media: media_dtos(record.media),
            seasons: record.seasons.into_iter().map(SeasonDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDto {
    pub id: i32,
    pub movie_id: Option<i32>,
    pub series_id: Option<i32>,
    pub added_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesDto>,
}

impl From<favorites::Model> for FavoriteDto {
    fn from(model: favorites::Model) -> Self {
        Self {
            id: model.id,
            movie_id: model.movie_id,
            series_id: model.series_id,
            added_at: model.added_at,
            movie: None,
            series: None,
        }
    }
}

impl From<FavoriteEntry> for FavoriteDto {
    fn from(entry: FavoriteEntry) -> Self {
        Self {
            movie: entry.movie.map(MovieDto::from),
            series: entry.series.map(SeriesDto::from),
            ..Self::from(entry.favorite)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: i32, kind: &str, is_default: bool) -> media::Model {
        media::Model {
            id,
            url: format!("https://cdn.example/{id}.jpg"),
            media_type: kind.to_string(),
            title: None,
            description: None,
            parent_kind: "movie".to_string(),
            parent_id: 1,
            is_default,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_asset_url_prefers_default() {
        let assets = vec![
            asset(1, "poster", false),
            asset(2, "poster", true),
            asset(3, "backdrop", false),
        ];
        assert_eq!(
            asset_url(&assets, AssetType::Poster).as_deref(),
            Some("https://cdn.example/2.jpg")
        );
        assert_eq!(
            asset_url(&assets, AssetType::Backdrop).as_deref(),
            Some("https://cdn.example/3.jpg")
        );
        assert_eq!(asset_url(&assets, AssetType::Trailer), None);
    }

    #[test]
    fn test_catalog_query_defaults() {
        let query = CatalogListQuery::default();
        let page = query.page();
        assert_eq!(page.limit, CatalogListQuery::DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);
        assert_eq!(query.sort(true), CatalogSort::default());
    }
}
