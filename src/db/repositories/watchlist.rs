use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::{InsertOutcome, is_unique_violation};
use crate::domain::{
    MediaType, NewWatchlistItem, UserId, WatchlistQuery, WatchlistSortField, timestamp_now,
};
use crate::entities::{prelude::*, watchlist};

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn owned_by(user_id: UserId) -> Select<Watchlist> {
        Watchlist::find().filter(watchlist::Column::UserId.eq(user_id.value()))
    }

    pub async fn add(
        &self,
        user_id: UserId,
        item: NewWatchlistItem,
    ) -> Result<InsertOutcome<watchlist::Model>> {
        let now = timestamp_now();
        let active = watchlist::ActiveModel {
            user_id: Set(user_id.value()),
            tmdb_id: Set(item.tmdb_id),
            media_type: Set(item.media_type.as_str().to_string()),
            title: Set(item.title),
            poster_path: Set(item.poster_path),
            added_at: Set(now.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(InsertOutcome::Created(model)),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find(user_id, item.tmdb_id, item.media_type)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Duplicate watchlist entry vanished"))?;
                Ok(InsertOutcome::Existing(existing))
            }
            Err(err) => Err(err).context("Failed to add watchlist entry"),
        }
    }

    pub async fn find(
        &self,
        user_id: UserId,
        tmdb_id: i64,
        media_type: MediaType,
    ) -> Result<Option<watchlist::Model>> {
        Ok(Self::owned_by(user_id)
            .filter(watchlist::Column::TmdbId.eq(tmdb_id))
            .filter(watchlist::Column::MediaType.eq(media_type.as_str()))
            .one(&self.conn)
            .await?)
    }

    pub async fn list(
        &self,
        user_id: UserId,
        query: &WatchlistQuery,
    ) -> Result<(Vec<watchlist::Model>, u64)> {
        let mut select = Self::owned_by(user_id);
        if let Some(media_type) = query.media_type {
            select = select.filter(watchlist::Column::MediaType.eq(media_type.as_str()));
        }

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count watchlist")?;

        let column = match query.sort.field {
            WatchlistSortField::AddedAt => watchlist::Column::AddedAt,
            WatchlistSortField::Title => watchlist::Column::Title,
            WatchlistSortField::MediaType => watchlist::Column::MediaType,
        };

        let rows = select
            .order_by(column, query.sort.order.as_order())
            .order_by_desc(watchlist::Column::Id)
            .limit(query.page.limit)
            .offset(query.page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list watchlist")?;

        Ok((rows, total))
    }

    /// Deletes the entry and returns it, scoped to the owner.
    pub async fn remove(&self, user_id: UserId, id: i32) -> Result<Option<watchlist::Model>> {
        let Some(existing) = Self::owned_by(user_id)
            .filter(watchlist::Column::Id.eq(id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        Watchlist::delete_by_id(existing.id)
            .exec(&self.conn)
            .await
            .context("Failed to remove watchlist entry")?;

        Ok(Some(existing))
    }

    /// `(media_type, count)` pairs for the user's entries.
    pub async fn counts_by_type(&self, user_id: UserId) -> Result<Vec<(String, i64)>> {
        Ok(Self::owned_by(user_id)
            .select_only()
            .column(watchlist::Column::MediaType)
            .column_as(watchlist::Column::Id.count(), "count")
            .group_by(watchlist::Column::MediaType)
            .into_tuple()
            .all(&self.conn)
            .await?)
    }

    pub async fn latest(&self, user_id: UserId) -> Result<Option<watchlist::Model>> {
        Ok(Self::owned_by(user_id)
            .order_by_desc(watchlist::Column::AddedAt)
            .order_by_desc(watchlist::Column::Id)
            .one(&self.conn)
            .await?)
    }

    pub async fn count(&self, user_id: UserId) -> Result<u64> {
        Ok(Self::owned_by(user_id).count(&self.conn).await?)
    }
}
