//! Domain types for the catalog and user-content subsystems.
//!
//! Newtype identifiers, content references and paging primitives shared by the
//! repositories, services and HTTP layer.

pub mod catalog;
pub mod user_content;

pub use catalog::{
    AssetType, CatalogFilter, CatalogSort, CatalogSortField, LIKE_ESCAPE, MediaParentKind,
    SeriesStatus, search_text,
};
pub use user_content::{
    HistoryClear, HistoryQuery, HistorySortField, ListSort, NewWatchlistItem, RatingInput,
    RatingQuery, RatingSortField, WatchProgressInput, WatchlistQuery, WatchlistSortField,
};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered user.
///
/// # Examples
///
/// ```rust
/// use reelhub::domain::UserId;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "UserId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

/// Account role carried by every authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Identity resolved from a bearer token by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Kind of externally identified content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Episode,
}

impl MediaType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Episode => "episode",
        }
    }

    /// Watchlist entries only track whole titles.
    #[must_use]
    pub const fn is_title(&self) -> bool {
        matches!(self, Self::Movie | Self::Tv)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            "episode" => Ok(Self::Episode),
            other => Err(format!("Invalid media type: {other}")),
        }
    }
}

/// Reference to content owned by the metadata provider.
///
/// Episodes must carry both a season and an episode number. Movies never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalRef {
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

impl ExternalRef {
    pub fn new(
        tmdb_id: i64,
        media_type: MediaType,
        season_number: Option<i32>,
        episode_number: Option<i32>,
    ) -> Result<Self, String> {
        if tmdb_id <= 0 {
            return Err("tmdbId must be a positive integer".to_string());
        }

        let (season_number, episode_number) = match media_type {
            MediaType::Movie => (None, None),
            MediaType::Episode => match (season_number, episode_number) {
                (Some(s), Some(e)) => (Some(s), Some(e)),
                _ => {
                    return Err(
                        "seasonNumber and episodeNumber are required for episodes".to_string()
                    );
                }
            },
            MediaType::Tv => match (season_number, episode_number) {
                (Some(s), Some(e)) => (Some(s), Some(e)),
                (None, None) => (None, None),
                _ => {
                    return Err(
                        "seasonNumber and episodeNumber must be provided together".to_string()
                    );
                }
            },
        };

        if season_number.is_some_and(|s| s < 0) || episode_number.is_some_and(|e| e <= 0) {
            return Err("Invalid season or episode number".to_string());
        }

        Ok(Self {
            tmdb_id,
            media_type,
            season_number,
            episode_number,
        })
    }

    /// NULL-free key used for uniqueness per user.
    #[must_use]
    pub fn content_key(&self) -> String {
        match (self.season_number, self.episode_number) {
            (Some(s), Some(e)) => format!("{}:{}:{s}:{e}", self.media_type, self.tmdb_id),
            _ => format!("{}:{}", self.media_type, self.tmdb_id),
        }
    }
}

/// Target of a favorite, always exactly one local catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteTarget {
    Movie(i32),
    Series(i32),
}

impl FavoriteTarget {
    pub fn from_parts(movie_id: Option<i32>, series_id: Option<i32>) -> Result<Self, String> {
        match (movie_id, series_id) {
            (Some(id), None) => Ok(Self::Movie(id)),
            (None, Some(id)) => Ok(Self::Series(id)),
            (Some(_), Some(_)) => Err("Provide either movieId or seriesId, not both".to_string()),
            (None, None) => Err("movieId or seriesId is required".to_string()),
        }
    }
}

/// Sort order enumeration to replace boolean blindness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Parses `ASC`/`DESC` case-insensitively.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::to_ascii_uppercase).as_deref() {
            Some("ASC") => Some(Self::Ascending),
            Some("DESC") => Some(Self::Descending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_order(&self) -> sea_orm::Order {
        match self {
            Self::Ascending => sea_orm::Order::Asc,
            Self::Descending => sea_orm::Order::Desc,
        }
    }
}

/// Resolved limit/offset window for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    pub const MAX_LIMIT: u64 = 100;

    /// `page` (1-based) wins over `offset` when both are given.
    #[must_use]
    pub fn new(
        limit: Option<u64>,
        offset: Option<u64>,
        page: Option<u64>,
        default_limit: u64,
    ) -> Self {
        let limit = limit
            .unwrap_or(default_limit)
            .clamp(1, Self::MAX_LIMIT);
        let offset = match page {
            Some(page) => page.max(1).saturating_sub(1).saturating_mul(limit),
            None => offset.unwrap_or(0),
        };

        Self { limit, offset }
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.offset / self.limit + 1
    }
}

/// Paging metadata attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    #[must_use]
    pub const fn new(total: u64, request: PageRequest) -> Self {
        let total_pages = total.div_ceil(request.limit);
        let page = request.page();

        Self {
            total,
            page,
            limit: request.limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Current time in the storage format (RFC 3339, UTC, microseconds).
///
/// Fixed width, so lexicographic order matches chronological order.
#[must_use]
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Whole days elapsed since a stored timestamp.
#[must_use]
pub fn days_since(value: &str) -> Option<i64> {
    parse_timestamp(value).map(|at| (Utc::now() - at).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_null_free() {
        let movie = ExternalRef::new(27205, MediaType::Movie, Some(1), Some(2)).unwrap();
        assert_eq!(movie.content_key(), "movie:27205");
        assert_eq!(movie.season_number, None);

        let episode = ExternalRef::new(1396, MediaType::Episode, Some(1), Some(1)).unwrap();
        assert_eq!(episode.content_key(), "episode:1396:1:1");

        let show = ExternalRef::new(1396, MediaType::Tv, None, None).unwrap();
        assert_eq!(show.content_key(), "tv:1396");
    }

    #[test]
    fn test_episode_ref_requires_numbers() {
        assert!(ExternalRef::new(1396, MediaType::Episode, Some(1), None).is_err());
        assert!(ExternalRef::new(1396, MediaType::Episode, None, None).is_err());
        assert!(ExternalRef::new(1396, MediaType::Tv, Some(1), None).is_err());
        assert!(ExternalRef::new(0, MediaType::Movie, None, None).is_err());
    }

    #[test]
    fn test_favorite_target_exactly_one() {
        assert_eq!(
            FavoriteTarget::from_parts(Some(3), None),
            Ok(FavoriteTarget::Movie(3))
        );
        assert_eq!(
            FavoriteTarget::from_parts(None, Some(4)),
            Ok(FavoriteTarget::Series(4))
        );
        assert!(FavoriteTarget::from_parts(Some(1), Some(2)).is_err());
        assert!(FavoriteTarget::from_parts(None, None).is_err());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse(Some("asc")), Some(SortOrder::Ascending));
        assert_eq!(SortOrder::parse(Some("DESC")), Some(SortOrder::Descending));
        assert_eq!(SortOrder::parse(Some("sideways")), None);
        assert_eq!(SortOrder::parse(None), None);
    }

    #[test]
    fn test_page_request_from_page_and_offset() {
        let by_page = PageRequest::new(Some(10), None, Some(3), 20);
        assert_eq!(by_page.offset, 20);
        assert_eq!(by_page.page(), 3);

        let by_offset = PageRequest::new(None, Some(5), None, 10);
        assert_eq!(by_offset, PageRequest { limit: 10, offset: 5 });

        let clamped = PageRequest::new(Some(10_000), None, None, 10);
        assert_eq!(clamped.limit, PageRequest::MAX_LIMIT);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(25, PageRequest::new(Some(10), None, Some(3), 10));
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let first = Pagination::new(25, PageRequest::new(Some(10), None, Some(1), 10));
        assert!(first.has_next);
        assert!(!first.has_prev);

        let empty = Pagination::new(0, PageRequest::new(Some(10), None, None, 10));
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let a = format_timestamp(parse_timestamp("2024-01-01").unwrap());
        let b = format_timestamp(parse_timestamp("2024-01-01T00:00:00.5Z").unwrap());
        assert!(a < b);
        assert_eq!(a, "2024-01-01T00:00:00.000000Z");
    }
}
