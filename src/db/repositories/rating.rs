use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use super::Upserted;
use crate::domain::{ExternalRef, RatingInput, RatingQuery, RatingSortField, UserId, timestamp_now};
use crate::entities::{prelude::*, ratings};

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn owned_by(user_id: UserId) -> Select<Ratings> {
        Ratings::find().filter(ratings::Column::UserId.eq(user_id.value()))
    }

    /// Inserts or overwrites the user's rating for `content`.
    ///
    /// A single statement keyed on `(user_id, content_key)`, so concurrent
    /// calls for the same content never produce two rows.
    pub async fn upsert(
        &self,
        user_id: UserId,
        content: &ExternalRef,
        input: RatingInput,
    ) -> Result<Upserted<ratings::Model>> {
        let now = timestamp_now();
        let key = content.content_key();

        let active = ratings::ActiveModel {
            user_id: Set(user_id.value()),
            tmdb_id: Set(content.tmdb_id),
            media_type: Set(content.media_type.as_str().to_string()),
            season_number: Set(content.season_number),
            episode_number: Set(content.episode_number),
            content_key: Set(key.clone()),
            rating: Set(input.rating),
            comment: Set(input.comment),
            title: Set(input.title),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        Ratings::insert(active)
            .on_conflict(
                OnConflict::columns([ratings::Column::UserId, ratings::Column::ContentKey])
                    .update_columns([
                        ratings::Column::Rating,
                        ratings::Column::Comment,
                        ratings::Column::Title,
                        ratings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert rating")?;

        let model = self
            .find_by_key(user_id, &key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Rating missing after upsert: {key}"))?;

        let created = model.created_at == now;
        Ok(Upserted { model, created })
    }

    pub async fn find(
        &self,
        user_id: UserId,
        content: &ExternalRef,
    ) -> Result<Option<ratings::Model>> {
        self.find_by_key(user_id, &content.content_key()).await
    }

    async fn find_by_key(&self, user_id: UserId, key: &str) -> Result<Option<ratings::Model>> {
        Ok(Self::owned_by(user_id)
            .filter(ratings::Column::ContentKey.eq(key))
            .one(&self.conn)
            .await?)
    }

    pub async fn list(
        &self,
        user_id: UserId,
        query: &RatingQuery,
    ) -> Result<(Vec<ratings::Model>, u64)> {
        let mut select = Self::owned_by(user_id);
        if let Some(media_type) = query.media_type {
            select = select.filter(ratings::Column::MediaType.eq(media_type.as_str()));
        }
        if let Some(min) = query.min_rating {
            select = select.filter(ratings::Column::Rating.gte(min));
        }
        if let Some(max) = query.max_rating {
            select = select.filter(ratings::Column::Rating.lte(max));
        }

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count ratings")?;

        let column = match query.sort.field {
            RatingSortField::UpdatedAt => ratings::Column::UpdatedAt,
            RatingSortField::Rating => ratings::Column::Rating,
            RatingSortField::Title => ratings::Column::Title,
            RatingSortField::MediaType => ratings::Column::MediaType,
        };

        let rows = select
            .order_by(column, query.sort.order.as_order())
            .order_by_desc(ratings::Column::Id)
            .limit(query.page.limit)
            .offset(query.page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list ratings")?;

        Ok((rows, total))
    }

    /// Deletes by id within the owner's ratings, returning the removed row.
    pub async fn delete(&self, user_id: UserId, id: i32) -> Result<Option<ratings::Model>> {
        let Some(existing) = Self::owned_by(user_id)
            .filter(ratings::Column::Id.eq(id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        Ratings::delete_by_id(existing.id)
            .exec(&self.conn)
            .await
            .context("Failed to delete rating")?;

        Ok(Some(existing))
    }

    /// `(score, count)` pairs, lowest score first.
    pub async fn distribution(&self, user_id: UserId) -> Result<Vec<(i32, i64)>> {
        Ok(Self::owned_by(user_id)
            .select_only()
            .column(ratings::Column::Rating)
            .column_as(ratings::Column::Id.count(), "count")
            .group_by(ratings::Column::Rating)
            .order_by_asc(ratings::Column::Rating)
            .into_tuple()
            .all(&self.conn)
            .await?)
    }

    pub async fn latest(&self, user_id: UserId) -> Result<Option<ratings::Model>> {
        Ok(Self::owned_by(user_id)
            .order_by_desc(ratings::Column::UpdatedAt)
            .order_by_desc(ratings::Column::Id)
            .one(&self.conn)
            .await?)
    }

    pub async fn count(&self, user_id: UserId) -> Result<u64> {
        Ok(Self::owned_by(user_id).count(&self.conn).await?)
    }
}
