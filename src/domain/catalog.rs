//! Query primitives for browsing the local catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SortOrder;

/// Filters shared by the movie and series listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

/// Escape character used by [`CatalogFilter::search_pattern`].
pub const LIKE_ESCAPE: char = '\\';

impl CatalogFilter {
    /// Lowercased `LIKE` pattern for the stored `search_text` column.
    ///
    /// `%`, `_` and the escape character match literally.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

        let mut pattern = String::with_capacity(term.len() + 2);
        pattern.push('%');
        for c in term.to_lowercase().chars() {
            if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// Folded title and description that catalog search matches against.
///
/// SQLite's `LIKE` only folds ASCII, so the text is lowercased here instead.
#[must_use]
pub fn search_text(title: &str, description: Option<&str>) -> String {
    let mut text = title.to_lowercase();
    if let Some(description) = description {
        text.push('\n');
        text.push_str(&description.to_lowercase());
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSortField {
    #[default]
    CreatedAt,
    Title,
    ReleaseYear,
    ViewCount,
    RatingAvg,
    /// Movies only
    Duration,
}

impl CatalogSortField {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "releaseYear" => Some(Self::ReleaseYear),
            "viewCount" => Some(Self::ViewCount),
            "ratingAVG" => Some(Self::RatingAvg),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }
}

/// Resolved ordering for a catalog listing.
///
/// Unknown sort fields fall back to `createdAt DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogSort {
    pub field: CatalogSortField,
    pub order: SortOrder,
}

impl CatalogSort {
    #[must_use]
    pub fn parse(sort_by: Option<&str>, order: Option<&str>, supports_duration: bool) -> Self {
        let field = sort_by
            .and_then(CatalogSortField::parse)
            .filter(|f| supports_duration || *f != CatalogSortField::Duration);

        match field {
            Some(field) => Self {
                field,
                order: SortOrder::parse(order).unwrap_or_default(),
            },
            None => Self::default(),
        }
    }
}

/// Owner kind of a media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaParentKind {
    Movie,
    Series,
    Season,
    Episode,
}

impl MediaParentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Season => "season",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Poster,
    Backdrop,
    Thumbnail,
    Video,
    Trailer,
    Other,
}

impl AssetType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Backdrop => "backdrop",
            Self::Thumbnail => "thumbnail",
            Self::Video => "video",
            Self::Trailer => "trailer",
            Self::Other => "other",
        }
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poster" => Ok(Self::Poster),
            "backdrop" => Ok(Self::Backdrop),
            "thumbnail" => Ok(Self::Thumbnail),
            "video" => Ok(Self::Video),
            "trailer" => Ok(Self::Trailer),
            "other" => Ok(Self::Other),
            other => Err(format!("Invalid media type: {other}")),
        }
    }
}

/// Lifecycle of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStatus {
    #[default]
    Ongoing,
    Completed,
    Cancelled,
}

impl SeriesStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_falls_back_to_created_desc() {
        let sort = CatalogSort::parse(Some("password"), Some("ASC"), true);
        assert_eq!(sort, CatalogSort::default());
        assert_eq!(sort.order, SortOrder::Descending);
    }

    #[test]
    fn test_known_sort_keeps_order() {
        let sort = CatalogSort::parse(Some("viewCount"), Some("asc"), true);
        assert_eq!(sort.field, CatalogSortField::ViewCount);
        assert_eq!(sort.order, SortOrder::Ascending);

        let sort = CatalogSort::parse(Some("title"), None, true);
        assert_eq!(sort.order, SortOrder::Descending);
    }

    #[test]
    fn test_duration_sort_is_movie_only() {
        let series = CatalogSort::parse(Some("duration"), Some("ASC"), false);
        assert_eq!(series, CatalogSort::default());

        let movies = CatalogSort::parse(Some("duration"), Some("ASC"), true);
        assert_eq!(movies.field, CatalogSortField::Duration);
    }

    #[test]
    fn test_search_pattern_trims_and_skips_blank() {
        let filter = CatalogFilter {
            search: Some("  dark ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%dark%"));

        let blank = CatalogFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.search_pattern(), None);
    }

    #[test]
    fn test_search_pattern_folds_case_and_escapes_wildcards() {
        let accented = CatalogFilter {
            search: Some("ÉLAN".to_string()),
            ..Default::default()
        };
        assert_eq!(accented.search_pattern().as_deref(), Some("%élan%"));

        let wildcards = CatalogFilter {
            search: Some(r"100%_\".to_string()),
            ..Default::default()
        };
        assert_eq!(
            wildcards.search_pattern().as_deref(),
            Some(r"%100\%\_\\%")
        );
    }

    #[test]
    fn test_search_text_joins_title_and_description() {
        assert_eq!(search_text("Élan Vital", None), "élan vital");
        assert_eq!(
            search_text("Dark", Some("Une VILLE allemande")),
            "dark\nune ville allemande"
        );
    }
}
