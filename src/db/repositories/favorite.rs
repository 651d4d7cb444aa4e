use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{InsertOutcome, is_unique_violation};
use crate::domain::{FavoriteTarget, UserId, timestamp_now};
use crate::entities::{favorites, prelude::*};

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Plain insert; the unique indexes decide duplicates.
    pub async fn add(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<InsertOutcome<favorites::Model>> {
        let (movie_id, series_id) = match target {
            FavoriteTarget::Movie(id) => (Some(id), None),
            FavoriteTarget::Series(id) => (None, Some(id)),
        };

        let active = favorites::ActiveModel {
            user_id: Set(user_id.value()),
            movie_id: Set(movie_id),
            series_id: Set(series_id),
            added_at: Set(timestamp_now()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(InsertOutcome::Created(model)),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find(user_id, target)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Duplicate favorite vanished"))?;
                Ok(InsertOutcome::Existing(existing))
            }
            Err(err) => Err(err).context("Failed to add favorite"),
        }
    }

    pub async fn find(
        &self,
        user_id: UserId,
        target: FavoriteTarget,
    ) -> Result<Option<favorites::Model>> {
        let query = Favorites::find().filter(favorites::Column::UserId.eq(user_id.value()));
        let query = match target {
            FavoriteTarget::Movie(id) => query.filter(favorites::Column::MovieId.eq(id)),
            FavoriteTarget::Series(id) => query.filter(favorites::Column::SeriesId.eq(id)),
        };

        Ok(query.one(&self.conn).await?)
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<favorites::Model>> {
        Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id.value()))
            .order_by_desc(favorites::Column::AddedAt)
            .order_by_desc(favorites::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list favorites")
    }

    /// Deletes only when the favorite belongs to `user_id`.
    pub async fn remove(&self, user_id: UserId, id: i32) -> Result<bool> {
        let result = Favorites::delete_many()
            .filter(favorites::Column::Id.eq(id))
            .filter(favorites::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to remove favorite")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self, user_id: UserId) -> Result<u64> {
        Ok(Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id.value()))
            .count(&self.conn)
            .await?)
    }
}
