use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use super::Upserted;
use crate::domain::{
    ExternalRef, HistoryClear, HistoryQuery, HistorySortField, UserId, WatchProgressInput,
    format_timestamp, timestamp_now,
};
use crate::entities::{prelude::*, watch_history};

/// Entry count and watched seconds for one bucket of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchTotals {
    pub entries: i64,
    pub seconds: i64,
}

/// History totals split by completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub completed: WatchTotals,
    pub in_progress: WatchTotals,
}

impl HistorySummary {
    #[must_use]
    pub const fn total_entries(&self) -> i64 {
        self.completed.entries + self.in_progress.entries
    }

    #[must_use]
    pub const fn total_seconds(&self) -> i64 {
        self.completed.seconds + self.in_progress.seconds
    }
}

pub struct WatchHistoryRepository {
    conn: DatabaseConnection,
}

impl WatchHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn owned_by(user_id: UserId) -> Select<WatchHistory> {
        WatchHistory::find().filter(watch_history::Column::UserId.eq(user_id.value()))
    }

    /// Records progress for `content`. `watched_at` moves to now on every call.
    pub async fn upsert(
        &self,
        user_id: UserId,
        content: &ExternalRef,
        input: WatchProgressInput,
    ) -> Result<Upserted<watch_history::Model>> {
        let now = timestamp_now();
        let key = content.content_key();

        let active = watch_history::ActiveModel {
            user_id: Set(user_id.value()),
            tmdb_id: Set(content.tmdb_id),
            media_type: Set(content.media_type.as_str().to_string()),
            season_number: Set(content.season_number),
            episode_number: Set(content.episode_number),
            content_key: Set(key.clone()),
            title: Set(input.title),
            poster_path: Set(input.poster_path),
            progress: Set(input.progress),
            duration: Set(input.duration),
            completed: Set(input.completed),
            watched_at: Set(now.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        WatchHistory::insert(active)
            .on_conflict(
                OnConflict::columns([
                    watch_history::Column::UserId,
                    watch_history::Column::ContentKey,
                ])
                .update_columns([
                    watch_history::Column::Title,
                    watch_history::Column::PosterPath,
                    watch_history::Column::Progress,
                    watch_history::Column::Duration,
                    watch_history::Column::Completed,
                    watch_history::Column::WatchedAt,
                    watch_history::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert watch history")?;

        let model = self
            .find_by_key(user_id, &key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("History entry missing after upsert: {key}"))?;

        let created = model.created_at == now;
        Ok(Upserted { model, created })
    }

    pub async fn find(
        &self,
        user_id: UserId,
        content: &ExternalRef,
    ) -> Result<Option<watch_history::Model>> {
        self.find_by_key(user_id, &content.content_key()).await
    }

    async fn find_by_key(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<Option<watch_history::Model>> {
        Ok(Self::owned_by(user_id)
            .filter(watch_history::Column::ContentKey.eq(key))
            .one(&self.conn)
            .await?)
    }

    pub async fn list(
        &self,
        user_id: UserId,
        query: &HistoryQuery,
    ) -> Result<(Vec<watch_history::Model>, u64)> {
        let mut select = Self::owned_by(user_id);
        if let Some(media_type) = query.media_type {
            select = select.filter(watch_history::Column::MediaType.eq(media_type.as_str()));
        }
        if let Some(completed) = query.completed {
            select = select.filter(watch_history::Column::Completed.eq(completed));
        }

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count watch history")?;

        let column = match query.sort.field {
            HistorySortField::WatchedAt => watch_history::Column::WatchedAt,
            HistorySortField::Title => watch_history::Column::Title,
            HistorySortField::Progress => watch_history::Column::Progress,
            HistorySortField::MediaType => watch_history::Column::MediaType,
        };

        let rows = select
            .order_by(column, query.sort.order.as_order())
            .order_by_desc(watch_history::Column::Id)
            .limit(query.page.limit)
            .offset(query.page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list watch history")?;

        Ok((rows, total))
    }

    /// Unfinished entries with some progress, most recently watched first.
    pub async fn continue_watching(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<watch_history::Model>> {
        Self::owned_by(user_id)
            .filter(watch_history::Column::Completed.eq(false))
            .filter(watch_history::Column::Progress.gt(0))
            .order_by_desc(watch_history::Column::WatchedAt)
            .order_by_desc(watch_history::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to load continue-watching list")
    }

    /// Bulk delete; returns how many rows were removed.
    pub async fn clear(&self, user_id: UserId, filter: HistoryClear) -> Result<u64> {
        let mut delete = WatchHistory::delete_many()
            .filter(watch_history::Column::UserId.eq(user_id.value()));
        if let Some(media_type) = filter.media_type {
            delete = delete.filter(watch_history::Column::MediaType.eq(media_type.as_str()));
        }
        if let Some(before) = filter.before {
            delete = delete.filter(watch_history::Column::WatchedAt.lt(format_timestamp(before)));
        }

        let result = delete
            .exec(&self.conn)
            .await
            .context("Failed to clear watch history")?;

        Ok(result.rows_affected)
    }

    pub async fn summary(&self, user_id: UserId) -> Result<HistorySummary> {
        let rows: Vec<(bool, i64, Option<i64>)> = Self::owned_by(user_id)
            .select_only()
            .column(watch_history::Column::Completed)
            .column_as(watch_history::Column::Id.count(), "entries")
            .column_as(watch_history::Column::Progress.sum(), "seconds")
            .group_by(watch_history::Column::Completed)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to summarize watch history")?;

        let mut summary = HistorySummary::default();
        for (completed, entries, seconds) in rows {
            let totals = WatchTotals {
                entries,
                seconds: seconds.unwrap_or(0),
            };
            if completed {
                summary.completed = totals;
            } else {
                summary.in_progress = totals;
            }
        }

        Ok(summary)
    }

    /// Per media type totals, in media type order.
    pub async fn by_type(&self, user_id: UserId) -> Result<Vec<(String, WatchTotals)>> {
        let rows: Vec<(String, i64, Option<i64>)> = Self::owned_by(user_id)
            .select_only()
            .column(watch_history::Column::MediaType)
            .column_as(watch_history::Column::Id.count(), "entries")
            .column_as(watch_history::Column::Progress.sum(), "seconds")
            .group_by(watch_history::Column::MediaType)
            .order_by_asc(watch_history::Column::MediaType)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group watch history")?;

        Ok(rows
            .into_iter()
            .map(|(media_type, entries, seconds)| {
                (
                    media_type,
                    WatchTotals {
                        entries,
                        seconds: seconds.unwrap_or(0),
                    },
                )
            })
            .collect())
    }

    pub async fn latest(&self, user_id: UserId) -> Result<Option<watch_history::Model>> {
        Ok(Self::owned_by(user_id)
            .order_by_desc(watch_history::Column::WatchedAt)
            .order_by_desc(watch_history::Column::Id)
            .one(&self.conn)
            .await?)
    }
}
