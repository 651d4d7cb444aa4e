use std::str::FromStr;

use super::ApiError;
use crate::domain::{ExternalRef, MediaType};

pub fn validate_id(id: i32, what: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {what} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// TMDB serves at most 500 pages for any listing.
pub fn validate_page(page: Option<u32>) -> Result<u32, ApiError> {
    const MAX_PAGE: u32 = 500;

    let page = page.unwrap_or(1);
    if !(1..=MAX_PAGE).contains(&page) {
        return Err(ApiError::validation(format!(
            "Invalid page: {page}. Page must be between 1 and {MAX_PAGE}"
        )));
    }
    Ok(page)
}

pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = query.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("query is required"));
    }
    Ok(trimmed)
}

/// Parses an optional query value, falling back to `T::default()` when absent.
pub fn parse_or_default<T>(value: Option<&str>, field: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = String> + Default,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map_err(|e: String| ApiError::validation(format!("Invalid {field}: {e}"))),
        None => Ok(T::default()),
    }
}

pub fn parse_optional<T>(value: Option<&str>, field: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse()
                .map_err(|e: String| ApiError::validation(format!("Invalid {field}: {e}")))
        })
        .transpose()
}

pub fn require_media_type(value: Option<&str>) -> Result<MediaType, ApiError> {
    parse_optional(value, "mediaType")?.ok_or_else(|| ApiError::validation("mediaType is required"))
}

/// Builds an external content reference from loosely typed request fields.
pub fn external_ref(
    tmdb_id: Option<i64>,
    media_type: Option<&str>,
    season_number: Option<i32>,
    episode_number: Option<i32>,
) -> Result<ExternalRef, ApiError> {
    let tmdb_id = tmdb_id.ok_or_else(|| ApiError::validation("tmdbId is required"))?;
    let media_type = require_media_type(media_type)?;
    ExternalRef::new(tmdb_id, media_type, season_number, episode_number)
        .map_err(ApiError::validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tmdb::TmdbKind;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "movie").is_ok());
        assert!(validate_id(0, "movie").is_err());
        assert!(validate_id(-1, "movie").is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some(3)).unwrap(), 3);
        assert!(validate_page(Some(0)).is_err());
        assert!(validate_page(Some(501)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(Some("  dune ")).unwrap(), "dune");
        assert!(validate_search_query(Some("   ")).is_err());
        assert!(validate_search_query(None).is_err());
    }

    #[test]
    fn test_parse_or_default() {
        let kind: TmdbKind = parse_or_default(None, "type").unwrap();
        assert_eq!(kind, TmdbKind::Movie);
        let kind: TmdbKind = parse_or_default(Some("tv"), "type").unwrap();
        assert_eq!(kind, TmdbKind::Tv);
        assert!(parse_or_default::<TmdbKind>(Some("anime"), "type").is_err());
    }

    #[test]
    fn test_external_ref_requires_fields() {
        assert!(external_ref(None, Some("movie"), None, None).is_err());
        assert!(external_ref(Some(1), None, None, None).is_err());
        assert!(external_ref(Some(1), Some("episode"), Some(1), None).is_err());

        let content = external_ref(Some(1396), Some("episode"), Some(1), Some(2)).unwrap();
        assert_eq!(content.media_type, MediaType::Episode);
        assert_eq!(content.episode_number, Some(2));
    }
}
