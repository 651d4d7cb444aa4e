//! Query and input types for per-user content tracking.

use chrono::{DateTime, Utc};

use super::{MediaType, PageRequest, SortOrder};

/// A sortable column of a user-content listing.
pub trait SortField: Sized + Copy + Default {
    fn parse(value: &str) -> Option<Self>;
}

/// Ordering for a user-content listing.
///
/// Unknown fields fall back to the default field, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListSort<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F: SortField> ListSort<F> {
    #[must_use]
    pub fn parse(sort_by: Option<&str>, order: Option<&str>) -> Self {
        match sort_by.and_then(F::parse) {
            Some(field) => Self {
                field,
                order: SortOrder::parse(order).unwrap_or_default(),
            },
            None => Self {
                field: F::default(),
                order: SortOrder::Descending,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchlistSortField {
    #[default]
    AddedAt,
    Title,
    MediaType,
}

impl SortField for WatchlistSortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "addedAt" => Some(Self::AddedAt),
            "title" => Some(Self::Title),
            "mediaType" => Some(Self::MediaType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingSortField {
    #[default]
    UpdatedAt,
    Rating,
    Title,
    MediaType,
}

impl SortField for RatingSortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "updatedAt" => Some(Self::UpdatedAt),
            "rating" => Some(Self::Rating),
            "title" => Some(Self::Title),
            "mediaType" => Some(Self::MediaType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySortField {
    #[default]
    WatchedAt,
    Title,
    Progress,
    MediaType,
}

impl SortField for HistorySortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "watchedAt" => Some(Self::WatchedAt),
            "title" => Some(Self::Title),
            "progress" => Some(Self::Progress),
            "mediaType" => Some(Self::MediaType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WatchlistQuery {
    pub media_type: Option<MediaType>,
    pub sort: ListSort<WatchlistSortField>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy)]
pub struct RatingQuery {
    pub media_type: Option<MediaType>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub sort: ListSort<RatingSortField>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryQuery {
    pub media_type: Option<MediaType>,
    pub completed: Option<bool>,
    pub sort: ListSort<HistorySortField>,
    pub page: PageRequest,
}

/// Bulk-delete filter for watch history.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryClear {
    pub media_type: Option<MediaType>,
    /// Entries watched strictly before this instant
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewWatchlistItem {
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RatingInput {
    /// Already validated to 1..=10
    pub rating: i32,
    pub comment: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct WatchProgressInput {
    pub title: String,
    pub poster_path: Option<String>,
    /// Seconds, never negative
    pub progress: i32,
    /// Seconds, positive when present
    pub duration: Option<i32>,
    pub completed: bool,
}

/// `round(100 * progress / duration)`, or 0 when the duration is unknown.
#[must_use]
pub fn progress_percentage(progress: i32, duration: Option<i32>) -> i64 {
    match duration {
        Some(d) if d > 0 => (f64::from(progress) * 100.0 / f64::from(d)).round() as i64,
        _ => 0,
    }
}

/// Seconds left to watch; 0 once completed or when the duration is unknown.
#[must_use]
pub fn remaining_seconds(progress: i32, duration: Option<i32>, completed: bool) -> i64 {
    match duration {
        Some(d) if !completed => i64::from(d - progress).max(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sort_fallback() {
        let sort: ListSort<RatingSortField> = ListSort::parse(Some("drop table"), Some("ASC"));
        assert_eq!(sort.field, RatingSortField::UpdatedAt);
        assert_eq!(sort.order, SortOrder::Descending);

        let sort: ListSort<HistorySortField> = ListSort::parse(Some("progress"), Some("asc"));
        assert_eq!(sort.field, HistorySortField::Progress);
        assert_eq!(sort.order, SortOrder::Ascending);
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(600, Some(1200)), 50);
        assert_eq!(progress_percentage(1, Some(3)), 33);
        assert_eq!(progress_percentage(2, Some(3)), 67);
        assert_eq!(progress_percentage(600, None), 0);
    }

    #[test]
    fn test_remaining_seconds() {
        assert_eq!(remaining_seconds(600, Some(1200), false), 600);
        assert_eq!(remaining_seconds(600, Some(1200), true), 0);
        assert_eq!(remaining_seconds(600, None, false), 0);
        assert_eq!(remaining_seconds(1500, Some(1200), false), 0);
    }
}
