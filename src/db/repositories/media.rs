use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::{AssetType, MediaParentKind, timestamp_now};
use crate::entities::{media, prelude::*};

/// Which assets to load alongside catalog rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaScope {
    /// Only the default poster, for list views
    DefaultPoster,
    All,
}

#[derive(Debug, Clone)]
pub struct NewMedia {
    pub url: String,
    pub media_type: AssetType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub parent_kind: MediaParentKind,
    pub parent_id: i32,
    pub is_default: bool,
}

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Assets for many parents of one kind, grouped by parent id
    pub async fn for_parents(
        &self,
        kind: MediaParentKind,
        parent_ids: &[i32],
        scope: MediaScope,
    ) -> Result<HashMap<i32, Vec<media::Model>>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = Media::find()
            .filter(media::Column::ParentKind.eq(kind.as_str()))
            .filter(media::Column::ParentId.is_in(parent_ids.to_vec()));

        if scope == MediaScope::DefaultPoster {
            query = query
                .filter(media::Column::MediaType.eq(AssetType::Poster.as_str()))
                .filter(media::Column::IsDefault.eq(true));
        }

        let rows = query
            .order_by_desc(media::Column::IsDefault)
            .order_by_asc(media::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load media")?;

        let mut grouped: HashMap<i32, Vec<media::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.parent_id).or_default().push(row);
        }

        Ok(grouped)
    }

    /// Inserts an asset; a new default replaces the previous one in the same transaction.
    pub async fn add(&self, new: NewMedia) -> Result<media::Model> {
        let txn = self.conn.begin().await?;

        if new.is_default {
            Media::update_many()
                .col_expr(media::Column::IsDefault, Expr::value(false))
                .filter(media::Column::ParentKind.eq(new.parent_kind.as_str()))
                .filter(media::Column::ParentId.eq(new.parent_id))
                .filter(media::Column::MediaType.eq(new.media_type.as_str()))
                .exec(&txn)
                .await?;
        }

        let now = timestamp_now();
        let model = media::ActiveModel {
            url: Set(new.url),
            media_type: Set(new.media_type.as_str().to_string()),
            title: Set(new.title),
            description: Set(new.description),
            parent_kind: Set(new.parent_kind.as_str().to_string()),
            parent_id: Set(new.parent_id),
            is_default: Set(new.is_default),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert media")?;

        txn.commit().await?;
        Ok(model)
    }

    /// Makes `media_id` the single default of its (parent, type) group.
    /// Returns `None` when the asset does not exist.
    pub async fn set_default(&self, media_id: i32) -> Result<Option<media::Model>> {
        let txn = self.conn.begin().await?;

        let Some(target) = Media::find_by_id(media_id).one(&txn).await? else {
            return Ok(None);
        };

        Media::update_many()
            .col_expr(media::Column::IsDefault, Expr::value(false))
            .filter(media::Column::ParentKind.eq(target.parent_kind.as_str()))
            .filter(media::Column::ParentId.eq(target.parent_id))
            .filter(media::Column::MediaType.eq(target.media_type.as_str()))
            .filter(media::Column::Id.ne(target.id))
            .exec(&txn)
            .await?;

        let mut active: media::ActiveModel = target.into();
        active.is_default = Set(true);
        active.updated_at = Set(timestamp_now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(updated))
    }

    pub async fn defaults_for(
        &self,
        kind: MediaParentKind,
        parent_id: i32,
        media_type: AssetType,
    ) -> Result<Vec<media::Model>> {
        Ok(Media::find()
            .filter(media::Column::ParentKind.eq(kind.as_str()))
            .filter(media::Column::ParentId.eq(parent_id))
            .filter(media::Column::MediaType.eq(media_type.as_str()))
            .filter(media::Column::IsDefault.eq(true))
            .all(&self.conn)
            .await?)
    }
}
