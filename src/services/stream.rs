use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use crate::config::StreamingConfig;

/// Optional subtitle parameters forwarded to the embed player.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    pub subtitle_lang: Option<String>,
    pub subtitle_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeStream {
    pub service: &'static str,
    pub url: String,
    pub quality: &'static str,
}

/// Deterministic embed URL construction. Never touches the network.
#[derive(Debug, Clone)]
pub struct StreamUrlBuilder {
    primary_domain: String,
    vidsrc_base_url: String,
    embedsu_base_url: String,
    superembed_base_url: String,
}

impl StreamUrlBuilder {
    pub fn new(config: &StreamingConfig) -> Result<Self> {
        let primary_domain = config
            .domains
            .first()
            .context("No streaming domain configured")?
            .clone();

        Ok(Self {
            primary_domain,
            vidsrc_base_url: config.vidsrc_base_url.trim_end_matches('/').to_string(),
            embedsu_base_url: config.embedsu_base_url.trim_end_matches('/').to_string(),
            superembed_base_url: config.superembed_base_url.clone(),
        })
    }

    fn embed_url(&self, kind: &str, params: Vec<(&str, String)>) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("https://{}/embed/{kind}", self.primary_domain),
            params,
        )
        .context("Invalid stream URL")?;
        Ok(url.to_string())
    }

    /// The IMDb id is preferred over the TMDB id when present.
    pub fn movie_url(
        &self,
        tmdb_id: i64,
        imdb_id: Option<&str>,
        options: &StreamOptions,
    ) -> Result<String> {
        let mut params = vec![id_param(tmdb_id, imdb_id)];
        push_subtitles(&mut params, options);
        self.embed_url("movie", params)
    }

    pub fn episode_url(
        &self,
        tmdb_id: i64,
        season: i32,
        episode: i32,
        imdb_id: Option<&str>,
        options: &StreamOptions,
    ) -> Result<String> {
        let mut params = vec![
            id_param(tmdb_id, imdb_id),
            ("season", season.to_string()),
            ("episode", episode.to_string()),
        ];
        push_subtitles(&mut params, options);
        self.embed_url("tv", params)
    }

    #[must_use]
    pub fn movie_alternatives(&self, tmdb_id: i64) -> Vec<AlternativeStream> {
        vec![
            AlternativeStream {
                service: "VidSrc",
                url: format!("{}/movie/{tmdb_id}", self.vidsrc_base_url),
                quality: "HD",
            },
            AlternativeStream {
                service: "Embed.su",
                url: format!("{}/movie/{tmdb_id}", self.embedsu_base_url),
                quality: "HD",
            },
            AlternativeStream {
                service: "SuperEmbed",
                url: format!("{}?video_id={tmdb_id}&tmdb=1", self.superembed_base_url),
                quality: "HD",
            },
        ]
    }

    #[must_use]
    pub fn episode_alternatives(
        &self,
        tmdb_id: i64,
        season: i32,
        episode: i32,
    ) -> Vec<AlternativeStream> {
        vec![
            AlternativeStream {
                service: "VidSrc",
                url: format!(
                    "{}/tv/{tmdb_id}/{season}/{episode}",
                    self.vidsrc_base_url
                ),
                quality: "HD",
            },
            AlternativeStream {
                service: "Embed.su",
                url: format!(
                    "{}/tv/{tmdb_id}/{season}/{episode}",
                    self.embedsu_base_url
                ),
                quality: "HD",
            },
        ]
    }
}

fn id_param(tmdb_id: i64, imdb_id: Option<&str>) -> (&'static str, String) {
    match imdb_id.filter(|id| !id.is_empty()) {
        Some(imdb) => ("imdb", imdb.to_string()),
        None => ("tmdb", tmdb_id.to_string()),
    }
}

fn push_subtitles(params: &mut Vec<(&str, String)>, options: &StreamOptions) {
    if let Some(lang) = options.subtitle_lang.as_deref().filter(|s| !s.is_empty()) {
        params.push(("ds_lang", lang.to_string()));
    }
    if let Some(url) = options.subtitle_url.as_deref().filter(|s| !s.is_empty()) {
        params.push(("sub_url", url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> StreamUrlBuilder {
        StreamUrlBuilder::new(&StreamingConfig::default()).unwrap()
    }

    #[test]
    fn test_movie_url_prefers_imdb() {
        let b = builder();
        assert_eq!(
            b.movie_url(27205, Some("tt1375666"), &StreamOptions::default())
                .unwrap(),
            "https://vidsrc.xyz/embed/movie?imdb=tt1375666"
        );
        assert_eq!(
            b.movie_url(27205, None, &StreamOptions::default()).unwrap(),
            "https://vidsrc.xyz/embed/movie?tmdb=27205"
        );
    }

    #[test]
    fn test_episode_url_with_subtitles() {
        let options = StreamOptions {
            subtitle_lang: Some("fr".to_string()),
            subtitle_url: Some("https://subs.example/a b.vtt".to_string()),
        };
        let url = builder()
            .episode_url(1396, 1, 2, None, &options)
            .unwrap();
        assert_eq!(
            url,
            "https://vidsrc.xyz/embed/tv?tmdb=1396&season=1&episode=2&ds_lang=fr&sub_url=https%3A%2F%2Fsubs.example%2Fa+b.vtt"
        );
    }

    #[test]
    fn test_alternatives() {
        let b = builder();
        let movie = b.movie_alternatives(27205);
        assert_eq!(movie.len(), 3);
        assert_eq!(movie[0].url, "https://vidsrc.to/embed/movie/27205");
        assert_eq!(
            movie[2].url,
            "https://multiembed.mov/directstream.php?video_id=27205&tmdb=1"
        );

        let episode = b.episode_alternatives(1396, 1, 1);
        assert_eq!(episode.len(), 2);
        assert_eq!(episode[1].url, "https://embed.su/embed/tv/1396/1/1");
    }

    #[test]
    fn test_requires_a_domain() {
        let config = StreamingConfig {
            domains: Vec::new(),
            ..StreamingConfig::default()
        };
        assert!(StreamUrlBuilder::new(&config).is_err());
    }
}
