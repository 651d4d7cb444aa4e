use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::config::TmdbConfig;

const DETAIL_APPENDS: &str = "credits,videos,external_ids,recommendations,similar";

/// One page of a TMDB listing; results stay raw until normalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<TmdbGenre>,
}

/// Title kinds accepted by the typed TMDB endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TmdbKind {
    #[default]
    Movie,
    Tv,
}

impl TmdbKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for TmdbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TmdbKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(format!("type must be 'movie' or 'tv', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingKind {
    #[default]
    All,
    Movie,
    Tv,
    Person,
}

impl TrendingKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Person => "person",
        }
    }
}

impl FromStr for TrendingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            "person" => Ok(Self::Person),
            other => Err(format!("Invalid trending type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(format!("time must be 'day' or 'week', got '{other}'")),
        }
    }
}

/// Thin TMDB v3 client. Detail lookups return `Ok(None)` on a provider 404.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    #[must_use]
    pub fn new(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut query: Vec<(&str, &str)> = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        Url::parse_with_params(&format!("{}{path}", self.base_url), query)
            .with_context(|| format!("Invalid TMDB URL for {path}"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        if !self.has_api_key() {
            anyhow::bail!("TMDB API key is not configured");
        }

        let url = self.endpoint_url(path, params)?;
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                record_request(endpoint, "transport_error");
                return Err(err).with_context(|| format!("TMDB request failed: {path}"));
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            record_request(endpoint, "not_found");
            return Ok(None);
        }

        if !response.status().is_success() {
            record_request(endpoint, "error");
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        record_request(endpoint, "ok");
        let data = response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode TMDB response for {path}"))?;

        Ok(Some(data))
    }

    async fn get_page(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<TmdbPage> {
        self.get_json(endpoint, path, params)
            .await?
            .ok_or_else(|| anyhow::anyhow!("TMDB listing not found: {path}"))
    }

    pub async fn search_multi(&self, query: &str, page: u32) -> Result<TmdbPage> {
        self.get_page(
            "search_multi",
            "/search/multi",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn popular(&self, kind: TmdbKind, page: u32) -> Result<TmdbPage> {
        self.get_page(
            "popular",
            &format!("/{kind}/popular"),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn trending(
        &self,
        kind: TrendingKind,
        window: TimeWindow,
        page: u32,
    ) -> Result<TmdbPage> {
        self.get_page(
            "trending",
            &format!("/trending/{}/{}", kind.as_str(), window.as_str()),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn top_rated(&self, kind: TmdbKind, page: u32) -> Result<TmdbPage> {
        self.get_page(
            "top_rated",
            &format!("/{kind}/top_rated"),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn upcoming(&self, page: u32) -> Result<TmdbPage> {
        self.get_page(
            "upcoming",
            "/movie/upcoming",
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn movie_details(&self, id: i64) -> Result<Option<Value>> {
        self.get_json(
            "movie_details",
            &format!("/movie/{id}"),
            &[("append_to_response", DETAIL_APPENDS.to_string())],
        )
        .await
    }

    pub async fn tv_details(&self, id: i64) -> Result<Option<Value>> {
        self.get_json(
            "tv_details",
            &format!("/tv/{id}"),
            &[("append_to_response", DETAIL_APPENDS.to_string())],
        )
        .await
    }

    pub async fn season_details(&self, tv_id: i64, season_number: i32) -> Result<Option<Value>> {
        self.get_json(
            "season_details",
            &format!("/tv/{tv_id}/season/{season_number}"),
            &[],
        )
        .await
    }

    pub async fn episode_details(
        &self,
        tv_id: i64,
        season_number: i32,
        episode_number: i32,
    ) -> Result<Option<Value>> {
        self.get_json(
            "episode_details",
            &format!("/tv/{tv_id}/season/{season_number}/episode/{episode_number}"),
            &[],
        )
        .await
    }

    pub async fn genres(&self, kind: TmdbKind) -> Result<Vec<TmdbGenre>> {
        let list: GenreList = self
            .get_json("genres", &format!("/genre/{kind}/list"), &[])
            .await?
            .ok_or_else(|| anyhow::anyhow!("TMDB genre list not found for {kind}"))?;

        Ok(list.genres)
    }

    pub async fn discover_by_genre(
        &self,
        genre_id: i64,
        kind: TmdbKind,
        page: u32,
    ) -> Result<TmdbPage> {
        self.get_page(
            "discover",
            &format!("/discover/{kind}"),
            &[
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}

fn record_request(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!("tmdb_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        let config = TmdbConfig {
            api_key: "secret".to_string(),
            ..TmdbConfig::default()
        };
        TmdbClient::new(Client::new(), &config)
    }

    #[test]
    fn test_endpoint_url_carries_key_and_language() {
        let url = client()
            .endpoint_url("/search/multi", &[("query", "la haine".to_string())])
            .unwrap();

        assert_eq!(url.host_str(), Some("api.themoviedb.org"));
        assert_eq!(url.path(), "/3/search/multi");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("api_key".to_string(), "secret".to_string())));
        assert!(pairs.contains(&("language".to_string(), "fr-FR".to_string())));
        assert!(pairs.contains(&("query".to_string(), "la haine".to_string())));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let tmdb = TmdbClient::new(Client::new(), &TmdbConfig::default());
        let err = tmdb.movie_details(27205).await.unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_page_decodes_with_missing_fields() {
        let page: TmdbPage = serde_json::from_str(r#"{"results":[{"id":1}]}"#).unwrap();
        assert_eq!(page.page, 0);
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("tv".parse::<TmdbKind>(), Ok(TmdbKind::Tv));
        assert!("person".parse::<TmdbKind>().is_err());
        assert_eq!("week".parse::<TimeWindow>(), Ok(TimeWindow::Week));
        assert_eq!("person".parse::<TrendingKind>(), Ok(TrendingKind::Person));
    }
}
