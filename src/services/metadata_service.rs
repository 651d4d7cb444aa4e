//! Metadata gateway over TMDB.
//!
//! Listing calls are normalized into app-shaped records with an explicit field
//! allow-list. Detail calls keep the provider payload and gain image URLs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::image::ImageUrls;
use super::stream::{AlternativeStream, StreamOptions, StreamUrlBuilder};
use crate::clients::tmdb::{TimeWindow, TmdbClient, TmdbGenre, TmdbKind, TmdbPage, TrendingKind};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Metadata provider error: {0}")]
    Provider(String),
}

impl From<anyhow::Error> for MetadataError {
    fn from(err: anyhow::Error) -> Self {
        Self::Provider(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppMovie {
    pub id: i64,
    pub media_type: &'static str,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
    pub original_language: Option<String>,
    pub adult: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppTv {
    pub id: i64,
    pub media_type: &'static str,
    /// Mirrors `name` so clients can treat movies and shows alike
    pub title: String,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
    pub origin_country: Vec<String>,
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppPerson {
    pub id: i64,
    pub media_type: &'static str,
    pub name: String,
    pub known_for_department: Option<String>,
    pub profile_path: Option<String>,
    pub profile_url: Option<String>,
    pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AppItem {
    Movie(AppMovie),
    Tv(AppTv),
    Person(AppPerson),
}

/// Normalized listing page; keeps TMDB's paging fields.
#[derive(Debug, Clone, Serialize)]
pub struct AppPage {
    pub page: u32,
    pub results: Vec<AppItem>,
    pub total_pages: u32,
    pub total_results: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    id: i64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    original_title: Option<String>,
    original_name: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    profile_path: Option<String>,
    vote_average: f64,
    vote_count: i64,
    popularity: f64,
    genre_ids: Vec<i64>,
    origin_country: Vec<String>,
    original_language: Option<String>,
    adult: bool,
    known_for_department: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub kind: TmdbKind,
    pub tmdb_id: i64,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub options: StreamOptions,
    /// Probe the primary URL with a HEAD request
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub tmdb_id: i64,
    pub media_type: &'static str,
    pub title: String,
    pub stream_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<i32>,
    pub alternatives: Vec<AlternativeStream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn search(&self, query: &str, page: u32) -> Result<AppPage, MetadataError>;

    async fn popular(&self, kind: TmdbKind, page: u32) -> Result<AppPage, MetadataError>;

    async fn trending(
        &self,
        kind: TrendingKind,
        window: TimeWindow,
        page: u32,
    ) -> Result<AppPage, MetadataError>;

    async fn top_rated(&self, kind: TmdbKind, page: u32) -> Result<AppPage, MetadataError>;

    async fn upcoming(&self, page: u32) -> Result<AppPage, MetadataError>;

    async fn movie_details(&self, id: i64) -> Result<Value, MetadataError>;

    async fn tv_details(&self, id: i64) -> Result<Value, MetadataError>;

    async fn season_details(&self, tv_id: i64, season_number: i32)
    -> Result<Value, MetadataError>;

    async fn episode_details(
        &self,
        tv_id: i64,
        season_number: i32,
        episode_number: i32,
    ) -> Result<Value, MetadataError>;

    async fn genres(&self, kind: TmdbKind) -> Result<Vec<TmdbGenre>, MetadataError>;

    async fn discover_by_genre(
        &self,
        genre_id: i64,
        kind: TmdbKind,
        page: u32,
    ) -> Result<AppPage, MetadataError>;

    /// Primary embed URL plus alternatives for a movie or a single episode.
    async fn stream(&self, request: StreamRequest) -> Result<StreamInfo, MetadataError>;

    /// `tt…` ids pass through; otherwise search by title. Never fails.
    async fn resolve_imdb_id(&self, title_or_id: &str) -> Option<String>;

    /// Best-effort HEAD probe; any failure reads as unavailable.
    async fn check_stream_availability(&self, url: &str) -> bool;
}

pub struct TmdbMetadataService {
    tmdb: TmdbClient,
    http: reqwest::Client,
    images: ImageUrls,
    streams: StreamUrlBuilder,
    probe_timeout: Duration,
}

impl TmdbMetadataService {
    #[must_use]
    pub const fn new(
        tmdb: TmdbClient,
        http: reqwest::Client,
        images: ImageUrls,
        streams: StreamUrlBuilder,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            tmdb,
            http,
            images,
            streams,
            probe_timeout,
        }
    }

    fn normalize_page(&self, page: TmdbPage, fallback: Option<TmdbKind>) -> AppPage {
        AppPage {
            page: page.page,
            results: page
                .results
                .into_iter()
                .filter_map(|item| normalize_item(&self.images, item, fallback))
                .collect(),
            total_pages: page.total_pages,
            total_results: page.total_results,
        }
    }

    async fn external_imdb_id(&self, details: &Value, title: &str) -> Option<String> {
        let direct = details
            .pointer("/external_ids/imdb_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());

        match direct {
            Some(id) => Some(id.to_string()),
            None => self.resolve_imdb_id(title).await,
        }
    }
}

#[async_trait]
impl MetadataService for TmdbMetadataService {
    async fn search(&self, query: &str, page: u32) -> Result<AppPage, MetadataError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MetadataError::InvalidArgument(
                "query is required".to_string(),
            ));
        }

        let results = self.tmdb.search_multi(query, page).await?;
        Ok(self.normalize_page(results, None))
    }

    async fn popular(&self, kind: TmdbKind, page: u32) -> Result<AppPage, MetadataError> {
        let results = self.tmdb.popular(kind, page).await?;
        Ok(self.normalize_page(results, Some(kind)))
    }

    async fn trending(
        &self,
        kind: TrendingKind,
        window: TimeWindow,
        page: u32,
    ) -> Result<AppPage, MetadataError> {
        let results = self.tmdb.trending(kind, window, page).await?;
        let fallback = match kind {
            TrendingKind::Movie => Some(TmdbKind::Movie),
            TrendingKind::Tv => Some(TmdbKind::Tv),
            TrendingKind::All | TrendingKind::Person => None,
        };
        Ok(self.normalize_page(results, fallback))
    }

    async fn top_rated(&self, kind: TmdbKind, page: u32) -> Result<AppPage, MetadataError> {
        let results = self.tmdb.top_rated(kind, page).await?;
        Ok(self.normalize_page(results, Some(kind)))
    }

    async fn upcoming(&self, page: u32) -> Result<AppPage, MetadataError> {
        let results = self.tmdb.upcoming(page).await?;
        Ok(self.normalize_page(results, Some(TmdbKind::Movie)))
    }

    async fn movie_details(&self, id: i64) -> Result<Value, MetadataError> {
        let movie = self
            .tmdb
            .movie_details(id)
            .await?
            .ok_or_else(|| MetadataError::NotFound("Movie not found".to_string()))?;
        Ok(enrich_title(&self.images, movie, TmdbKind::Movie))
    }

    async fn tv_details(&self, id: i64) -> Result<Value, MetadataError> {
        let tv = self
            .tmdb
            .tv_details(id)
            .await?
            .ok_or_else(|| MetadataError::NotFound("Series not found".to_string()))?;
        Ok(enrich_title(&self.images, tv, TmdbKind::Tv))
    }

    async fn season_details(
        &self,
        tv_id: i64,
        season_number: i32,
    ) -> Result<Value, MetadataError> {
        let season = self
            .tmdb
            .season_details(tv_id, season_number)
            .await?
            .ok_or_else(|| MetadataError::NotFound("Season not found".to_string()))?;
        Ok(enrich_season(&self.images, season))
    }

    async fn episode_details(
        &self,
        tv_id: i64,
        season_number: i32,
        episode_number: i32,
    ) -> Result<Value, MetadataError> {
        let episode = self
            .tmdb
            .episode_details(tv_id, season_number, episode_number)
            .await?
            .ok_or_else(|| MetadataError::NotFound("Episode not found".to_string()))?;
        Ok(with_still_url(&self.images, episode))
    }

    async fn genres(&self, kind: TmdbKind) -> Result<Vec<TmdbGenre>, MetadataError> {
        Ok(self.tmdb.genres(kind).await?)
    }

    async fn discover_by_genre(
        &self,
        genre_id: i64,
        kind: TmdbKind,
        page: u32,
    ) -> Result<AppPage, MetadataError> {
        let results = self.tmdb.discover_by_genre(genre_id, kind, page).await?;
        Ok(self.normalize_page(results, Some(kind)))
    }

    async fn stream(&self, request: StreamRequest) -> Result<StreamInfo, MetadataError> {
        let tmdb_id = request.tmdb_id;

        let mut info = match (request.kind, request.season, request.episode) {
            (TmdbKind::Movie, _, _) => {
                let details = self
                    .tmdb
                    .movie_details(tmdb_id)
                    .await?
                    .ok_or_else(|| MetadataError::NotFound("Movie not found".to_string()))?;
                let title = string_field(&details, "title").unwrap_or_else(|| "Contenu".into());
                let imdb_id = self.external_imdb_id(&details, &title).await;

                StreamInfo {
                    tmdb_id,
                    media_type: TmdbKind::Movie.as_str(),
                    stream_url: self.streams.movie_url(
                        tmdb_id,
                        imdb_id.as_deref(),
                        &request.options,
                    )?,
                    title,
                    season: None,
                    episode: None,
                    alternatives: self.streams.movie_alternatives(tmdb_id),
                    available: None,
                }
            }
            (TmdbKind::Tv, Some(season), Some(episode)) => {
                let details = self
                    .tmdb
                    .tv_details(tmdb_id)
                    .await?
                    .ok_or_else(|| MetadataError::NotFound("Series not found".to_string()))?;
                let name = string_field(&details, "name").unwrap_or_else(|| "Contenu".into());
                let imdb_id = self.external_imdb_id(&details, &name).await;

                StreamInfo {
                    tmdb_id,
                    media_type: TmdbKind::Tv.as_str(),
                    stream_url: self.streams.episode_url(
                        tmdb_id,
                        season,
                        episode,
                        imdb_id.as_deref(),
                        &request.options,
                    )?,
                    title: format!("{name} - S{season}E{episode}"),
                    season: Some(season),
                    episode: Some(episode),
                    alternatives: self.streams.episode_alternatives(tmdb_id, season, episode),
                    available: None,
                }
            }
            (TmdbKind::Tv, _, _) => {
                return Err(MetadataError::InvalidArgument(
                    "Invalid parameters: 'season' and 'episode' are required for series"
                        .to_string(),
                ));
            }
        };

        if request.check {
            info.available = Some(self.check_stream_availability(&info.stream_url).await);
        }

        Ok(info)
    }

    async fn resolve_imdb_id(&self, title_or_id: &str) -> Option<String> {
        if title_or_id.starts_with("tt") {
            return Some(title_or_id.to_string());
        }
        if title_or_id.trim().is_empty() {
            return None;
        }

        let results = match self.tmdb.search_multi(title_or_id, 1).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, title = %title_or_id, "IMDb id lookup failed");
                return None;
            }
        };

        let first = results.results.first()?;
        let id = first.get("id").and_then(Value::as_i64)?;

        let details = match first.get("media_type").and_then(Value::as_str) {
            Some("movie") => self.tmdb.movie_details(id).await,
            Some("tv") => self.tmdb.tv_details(id).await,
            _ => return None,
        };

        match details {
            Ok(Some(details)) => details
                .pointer("/external_ids/imdb_id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(ToString::to_string),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, title = %title_or_id, "IMDb id lookup failed");
                None
            }
        }
    }

    async fn check_stream_availability(&self, url: &str) -> bool {
        match self
            .http
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, url = %url, "Stream probe failed");
                false
            }
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(ToString::to_string)
}

fn path_field<'a>(value: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Projects a raw listing entry onto the app shape. Entries without a
/// recognizable kind are dropped.
fn normalize_item(images: &ImageUrls, item: Value, fallback: Option<TmdbKind>) -> Option<AppItem> {
    let raw: RawItem = serde_json::from_value(item).ok()?;

    let kind = match raw.media_type.as_deref() {
        Some("movie") => "movie",
        Some("tv") => "tv",
        Some("person") => "person",
        _ => fallback?.as_str(),
    };

    Some(match kind {
        "movie" => AppItem::Movie(format_movie_for_app(images, raw)),
        "tv" => AppItem::Tv(format_tv_for_app(images, raw)),
        _ => AppItem::Person(format_person_for_app(images, raw)),
    })
}

fn format_movie_for_app(images: &ImageUrls, raw: RawItem) -> AppMovie {
    AppMovie {
        id: raw.id,
        media_type: "movie",
        title: raw.title.or(raw.name).unwrap_or_default(),
        original_title: raw.original_title,
        overview: raw.overview,
        release_date: raw.release_date,
        poster_url: images.poster(raw.poster_path.as_deref()),
        backdrop_url: images.backdrop(raw.backdrop_path.as_deref()),
        poster_path: raw.poster_path,
        backdrop_path: raw.backdrop_path,
        vote_average: raw.vote_average,
        vote_count: raw.vote_count,
        popularity: raw.popularity,
        genre_ids: raw.genre_ids,
        original_language: raw.original_language,
        adult: raw.adult,
    }
}

fn format_tv_for_app(images: &ImageUrls, raw: RawItem) -> AppTv {
    let name = raw.name.or(raw.title).unwrap_or_default();
    AppTv {
        id: raw.id,
        media_type: "tv",
        title: name.clone(),
        name,
        original_name: raw.original_name,
        overview: raw.overview,
        first_air_date: raw.first_air_date,
        poster_url: images.poster(raw.poster_path.as_deref()),
        backdrop_url: images.backdrop(raw.backdrop_path.as_deref()),
        poster_path: raw.poster_path,
        backdrop_path: raw.backdrop_path,
        vote_average: raw.vote_average,
        vote_count: raw.vote_count,
        popularity: raw.popularity,
        genre_ids: raw.genre_ids,
        origin_country: raw.origin_country,
        original_language: raw.original_language,
    }
}

fn format_person_for_app(images: &ImageUrls, raw: RawItem) -> AppPerson {
    AppPerson {
        id: raw.id,
        media_type: "person",
        name: raw.name.unwrap_or_default(),
        known_for_department: raw.known_for_department,
        profile_url: images.poster(raw.profile_path.as_deref()),
        profile_path: raw.profile_path,
        popularity: raw.popularity,
    }
}

fn enrich_title(images: &ImageUrls, mut details: Value, kind: TmdbKind) -> Value {
    if let Some(obj) = details.as_object_mut() {
        let poster = images.poster(path_field(obj, "poster_path"));
        let backdrop = images.backdrop(path_field(obj, "backdrop_path"));
        obj.insert("poster_url".to_string(), poster.into());
        obj.insert("backdrop_url".to_string(), backdrop.into());
        obj.insert("media_type".to_string(), kind.as_str().into());
    }
    details
}

fn enrich_season(images: &ImageUrls, mut season: Value) -> Value {
    if let Some(obj) = season.as_object_mut() {
        let poster = images.poster(path_field(obj, "poster_path"));
        obj.insert("poster_url".to_string(), poster.into());

        if let Some(Value::Array(episodes)) = obj.get_mut("episodes") {
            for episode in episodes.iter_mut() {
                *episode = with_still_url(images, std::mem::take(episode));
            }
        }
    }
    season
}

fn with_still_url(images: &ImageUrls, mut episode: Value) -> Value {
    if let Some(obj) = episode.as_object_mut() {
        let still = images.poster(path_field(obj, "still_path"));
        obj.insert("still_url".to_string(), still.into());
    }
    episode
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn images() -> ImageUrls {
        ImageUrls::new("https://image.tmdb.org/t/p")
    }

    #[test]
    fn test_format_movie_uses_allow_list() {
        let raw = json!({
            "id": 27205,
            "title": "Inception",
            "poster_path": "/p.jpg",
            "backdrop_path": null,
            "vote_average": 8.4,
            "video": false,
            "secret_internal_field": "drop me"
        });

        let item = normalize_item(&images(), raw, Some(TmdbKind::Movie)).unwrap();
        let AppItem::Movie(movie) = &item else {
            panic!("expected a movie");
        };
        assert_eq!(movie.title, "Inception");
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert_eq!(movie.backdrop_url, None);

        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("secret_internal_field").is_none());
        assert!(out.get("video").is_none());
        assert_eq!(out["media_type"], "movie");
    }

    #[test]
    fn test_format_tv_copies_name_into_title() {
        let raw = json!({"id": 1396, "name": "Breaking Bad", "media_type": "tv"});
        let AppItem::Tv(tv) = normalize_item(&images(), raw, None).unwrap() else {
            panic!("expected a show");
        };
        assert_eq!(tv.title, "Breaking Bad");
        assert_eq!(tv.name, "Breaking Bad");
    }

    #[test]
    fn test_unknown_kind_is_dropped_without_fallback() {
        let raw = json!({"id": 1, "title": "??"});
        assert!(normalize_item(&images(), raw, None).is_none());

        let person = json!({"id": 2, "name": "Cillian Murphy", "media_type": "person"});
        assert!(matches!(
            normalize_item(&images(), person, None),
            Some(AppItem::Person(_))
        ));
    }

    #[test]
    fn test_enrich_details() {
        let movie = enrich_title(
            &images(),
            json!({"id": 27205, "poster_path": "/p.jpg", "backdrop_path": "/b.jpg", "runtime": 148}),
            TmdbKind::Movie,
        );
        assert_eq!(movie["runtime"], 148);
        assert_eq!(movie["media_type"], "movie");
        assert_eq!(movie["backdrop_url"], "https://image.tmdb.org/t/p/w1280/b.jpg");
    }

    #[test]
    fn test_enrich_season_episodes() {
        let season = enrich_season(
            &images(),
            json!({
                "poster_path": null,
                "episodes": [{"still_path": "/s1.jpg"}, {"still_path": null}]
            }),
        );
        assert!(season["poster_url"].is_null());
        assert_eq!(
            season["episodes"][0]["still_url"],
            "https://image.tmdb.org/t/p/w500/s1.jpg"
        );
        assert!(season["episodes"][1]["still_url"].is_null());
    }
}
