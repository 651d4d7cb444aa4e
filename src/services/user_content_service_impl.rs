//! `SeaORM` implementation of the `UserContentService` trait.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::db::{InsertOutcome, Store};
use crate::domain::{
    ExternalRef, FavoriteTarget, HistoryClear, HistoryQuery, MediaType, NewWatchlistItem,
    Pagination, RatingInput, RatingQuery, UserId, WatchProgressInput, WatchlistQuery,
};
use crate::entities::{favorites, watchlist};
use crate::services::image::ImageUrls;
use crate::services::user_content_service::{
    FavoriteEntry, GeneralStats, HistoryPage, HistoryStats, HistoryUpsert, ProgressView,
    RatingBucket, RatingStats, RatingUpsert, RatingView, RatingsPage, RecentActivity,
    RecentRating, RecentWatch, RecentWatchlistAddition, TypeTotals, UpsertAction,
    UserContentError, UserContentService, UserStats, WatchHistoryView, WatchlistItemView,
    WatchlistPage, WatchlistStats, average_rating,
};

pub struct SeaOrmUserContentService {
    store: Store,
    images: ImageUrls,
}

impl SeaOrmUserContentService {
    #[must_use]
    pub const fn new(store: Store, images: ImageUrls) -> Self {
        Self { store, images }
    }

    async fn join_favorites(
        &self,
        rows: Vec<favorites::Model>,
    ) -> Result<Vec<FavoriteEntry>, UserContentError> {
        let movie_ids: Vec<i32> = rows.iter().filter_map(|f| f.movie_id).collect();
        let series_ids: Vec<i32> = rows.iter().filter_map(|f| f.series_id).collect();

        let (movies, series) = futures::try_join!(
            self.store.get_movies_by_ids(&movie_ids),
            self.store.get_series_by_ids(&series_ids),
        )?;

        let mut movies: HashMap<i32, _> = movies.into_iter().map(|m| (m.movie.id, m)).collect();
        let mut series: HashMap<i32, _> = series.into_iter().map(|s| (s.series.id, s)).collect();

        Ok(rows
            .into_iter()
            .map(|favorite| FavoriteEntry {
                movie: favorite.movie_id.and_then(|id| movies.remove(&id)),
                series: favorite.series_id.and_then(|id| series.remove(&id)),
                favorite,
            })
            .collect())
    }
}

fn validation(message: &str) -> UserContentError {
    UserContentError::Validation(message.to_string())
}

fn require_title(title: &str) -> Result<(), UserContentError> {
    if title.trim().is_empty() {
        return Err(validation("title is required"));
    }
    Ok(())
}

fn validate_rating(input: &RatingInput) -> Result<(), UserContentError> {
    if !(1..=10).contains(&input.rating) {
        return Err(validation("rating must be between 1 and 10"));
    }
    require_title(&input.title)
}

fn validate_progress(input: &WatchProgressInput) -> Result<(), UserContentError> {
    require_title(&input.title)?;
    if input.progress < 0 {
        return Err(validation("progress must be a non-negative number of seconds"));
    }
    if input.duration.is_some_and(|d| d <= 0) {
        return Err(validation("duration must be a positive number of seconds"));
    }
    Ok(())
}

#[async_trait]
impl UserContentService for SeaOrmUserContentService {
    async fn add_favorite(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<FavoriteEntry, UserContentError> {
        let exists = match target {
            FavoriteTarget::Movie(id) => self.store.movie_exists(id).await?,
            FavoriteTarget::Series(id) => self.store.series_exists(id).await?,
        };
        if !exists {
            let message = match target {
                FavoriteTarget::Movie(_) => "Movie not found",
                FavoriteTarget::Series(_) => "Series not found",
            };
            return Err(UserContentError::NotFound(message.to_string()));
        }

        match self.store.add_favorite(user_id, target).await? {
            InsertOutcome::Created(favorite) => {
                debug!(user_id = user_id.value(), ?target, "Favorite added");
                let mut entries = self.join_favorites(vec![favorite]).await?;
                entries.pop().ok_or_else(|| {
                    UserContentError::Internal("Favorite join returned nothing".to_string())
                })
            }
            InsertOutcome::Existing(_) => Err(UserContentError::Conflict {
                message: "Already in favorites".to_string(),
                existing: None,
            }),
        }
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteEntry>, UserContentError> {
        let rows = self.store.list_favorites(user_id).await?;
        self.join_favorites(rows).await
    }

    async fn remove_favorite(&self, user_id: UserId, id: i32) -> Result<(), UserContentError> {
        if !self.store.remove_favorite(user_id, id).await? {
            return Err(UserContentError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }

    async fn add_to_watchlist(
        &self,
        user_id: UserId,
        item: NewWatchlistItem,
    ) -> Result<WatchlistItemView, UserContentError> {
        if !item.media_type.is_title() {
            return Err(validation("mediaType must be movie or tv"));
        }
        if item.tmdb_id <= 0 {
            return Err(validation("tmdbId must be a positive integer"));
        }
        require_title(&item.title)?;

        match self.store.add_to_watchlist(user_id, item).await? {
            InsertOutcome::Created(model) => {
                debug!(
                    user_id = user_id.value(),
                    tmdb_id = model.tmdb_id,
                    "Watchlist item added"
                );
                Ok(WatchlistItemView::new(model, &self.images))
            }
            InsertOutcome::Existing(model) => {
                let existing = WatchlistItemView::new(model, &self.images);
                Err(UserContentError::Conflict {
                    message: "Item already in watchlist".to_string(),
                    existing: serde_json::to_value(&existing).ok(),
                })
            }
        }
    }

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        id: i32,
    ) -> Result<watchlist::Model, UserContentError> {
        self.store
            .remove_from_watchlist(user_id, id)
            .await?
            .ok_or_else(|| UserContentError::NotFound("Watchlist item not found".to_string()))
    }

    async fn watchlist(
        &self,
        user_id: UserId,
        query: WatchlistQuery,
    ) -> Result<WatchlistPage, UserContentError> {
        let ((rows, total), counts) = futures::try_join!(
            self.store.list_watchlist(user_id, &query),
            self.store.watchlist_counts_by_type(user_id),
        )?;

        let count_of = |kind: MediaType| {
            counts
                .iter()
                .find(|(t, _)| t == kind.as_str())
                .map_or(0, |(_, n)| *n)
        };

        Ok(WatchlistPage {
            items: rows
                .into_iter()
                .map(|m| WatchlistItemView::new(m, &self.images))
                .collect(),
            pagination: Pagination::new(total, query.page),
            stats: WatchlistStats {
                total_movies: count_of(MediaType::Movie),
                total_tv: count_of(MediaType::Tv),
            },
        })
    }

    async fn check_watchlist(
        &self,
        user_id: UserId,
        tmdb_id: i64,
        media_type: MediaType,
    ) -> Result<Option<watchlist::Model>, UserContentError> {
        Ok(self
            .store
            .find_watchlist_item(user_id, tmdb_id, media_type)
            .await?)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        content: ExternalRef,
        input: RatingInput,
    ) -> Result<RatingUpsert, UserContentError> {
        validate_rating(&input)?;

        let upserted = self.store.upsert_rating(user_id, &content, input).await?;
        let action = UpsertAction::from_created(upserted.created);
        debug!(
            user_id = user_id.value(),
            tmdb_id = content.tmdb_id,
            ?action,
            "Rating saved"
        );

        Ok(RatingUpsert {
            rating: upserted.model.into(),
            action,
        })
    }

    async fn ratings(
        &self,
        user_id: UserId,
        query: RatingQuery,
    ) -> Result<RatingsPage, UserContentError> {
        if let (Some(min), Some(max)) = (query.min_rating, query.max_rating)
            && min > max
        {
            return Err(validation("minRating cannot exceed maxRating"));
        }

        let ((rows, total), distribution) = futures::try_join!(
            self.store.list_ratings(user_id, &query),
            self.store.rating_distribution(user_id),
        )?;

        Ok(RatingsPage {
            ratings: rows.into_iter().map(RatingView::from).collect(),
            pagination: Pagination::new(total, query.page),
            stats: RatingStats {
                average_rating: average_rating(&distribution),
                total_ratings: distribution.iter().map(|(_, n)| n).sum(),
                rating_distribution: distribution
                    .into_iter()
                    .map(|(rating, count)| RatingBucket { rating, count })
                    .collect(),
            },
        })
    }

    async fn rating(
        &self,
        user_id: UserId,
        content: ExternalRef,
    ) -> Result<Option<RatingView>, UserContentError> {
        Ok(self
            .store
            .find_rating(user_id, &content)
            .await?
            .map(RatingView::from))
    }

    async fn delete_rating(&self, user_id: UserId, id: i32) -> Result<RatingView, UserContentError> {
        self.store
            .delete_rating(user_id, id)
            .await?
            .map(RatingView::from)
            .ok_or_else(|| UserContentError::NotFound("Rating not found".to_string()))
    }

    async fn record_progress(
        &self,
        user_id: UserId,
        content: ExternalRef,
        input: WatchProgressInput,
    ) -> Result<HistoryUpsert, UserContentError> {
        validate_progress(&input)?;

        let upserted = self.store.record_progress(user_id, &content, input).await?;
        Ok(HistoryUpsert {
            action: UpsertAction::from_created(upserted.created),
            watch_history: WatchHistoryView::new(upserted.model, &self.images),
        })
    }

    async fn history(
        &self,
        user_id: UserId,
        query: HistoryQuery,
    ) -> Result<HistoryPage, UserContentError> {
        let ((rows, total), summary) = futures::try_join!(
            self.store.list_history(user_id, &query),
            self.store.history_summary(user_id),
        )?;

        Ok(HistoryPage {
            items: rows
                .into_iter()
                .map(|m| WatchHistoryView::new(m, &self.images))
                .collect(),
            pagination: Pagination::new(total, query.page),
            stats: HistoryStats {
                total_watched: summary.total_entries(),
                completed_count: summary.completed.entries,
                in_progress_count: summary.in_progress.entries,
                total_watch_time: summary.total_seconds(),
            },
        })
    }

    async fn progress(
        &self,
        user_id: UserId,
        content: ExternalRef,
    ) -> Result<Option<ProgressView>, UserContentError> {
        Ok(self
            .store
            .find_progress(user_id, &content)
            .await?
            .map(ProgressView::from))
    }

    async fn continue_watching(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<WatchHistoryView>, UserContentError> {
        let rows = self.store.continue_watching(user_id, limit).await?;
        Ok(rows
            .into_iter()
            .map(|m| WatchHistoryView::new(m, &self.images))
            .collect())
    }

    async fn clear_history(
        &self,
        user_id: UserId,
        filter: HistoryClear,
    ) -> Result<u64, UserContentError> {
        let removed = self.store.clear_history(user_id, filter).await?;
        info!(user_id = user_id.value(), removed, "Watch history cleared");
        Ok(removed)
    }

    async fn stats(&self, user_id: UserId) -> Result<UserStats, UserContentError> {
        let (
            watchlist_items,
            favorites,
            ratings_given,
            summary,
            distribution,
            watchlist_by_type,
            history_by_type,
            last_watchlist,
            last_watched,
            last_rating,
        ) = futures::try_join!(
            self.store.count_watchlist(user_id),
            self.store.count_favorites(user_id),
            self.store.count_ratings(user_id),
            self.store.history_summary(user_id),
            self.store.rating_distribution(user_id),
            self.store.watchlist_counts_by_type(user_id),
            self.store.history_by_type(user_id),
            self.store.latest_watchlist_item(user_id),
            self.store.latest_history_entry(user_id),
            self.store.latest_rating(user_id),
        )?;

        let total_seconds = summary.total_seconds();
        let general = GeneralStats {
            watchlist_items,
            favorites,
            ratings_given,
            items_watched: summary.total_entries(),
            total_watch_time_seconds: total_seconds,
            total_watch_time_hours: (total_seconds as f64 / 3600.0).round() as i64,
            average_rating: average_rating(&distribution),
        };

        let watch_history: BTreeMap<String, TypeTotals> = history_by_type
            .into_iter()
            .map(|(kind, totals)| {
                (
                    kind,
                    TypeTotals {
                        count: totals.entries,
                        total_time: totals.seconds,
                    },
                )
            })
            .collect();

        Ok(UserStats {
            general,
            watchlist: watchlist_by_type.into_iter().collect(),
            watch_history,
            recent_activity: RecentActivity {
                last_watchlist_addition: last_watchlist.map(|m| RecentWatchlistAddition {
                    title: m.title,
                    media_type: m.media_type,
                    added_at: m.added_at,
                }),
                last_watched: last_watched.map(|m| RecentWatch {
                    title: m.title,
                    media_type: m.media_type,
                    watched_at: m.watched_at,
                }),
                last_rating: last_rating.map(|m| RecentRating {
                    title: m.title,
                    rating: m.rating,
                    updated_at: m.updated_at,
                }),
            },
        })
    }
}
