use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

use crate::domain::timestamp_now;
use crate::entities::{categories, genres, prelude::*};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active categories by display order, then name
    pub async fn list_active(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::DisplayOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>> {
        Genres::find()
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list genres")
    }

    pub async fn by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, categories::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Categories::find()
            .filter(categories::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }

    pub async fn genres_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, genres::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Genres::find()
            .filter(genres::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|g| (g.id, g)).collect())
    }

    pub async fn count_categories(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        Ok(Categories::find().count(&self.conn).await?)
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        display_order: i32,
    ) -> Result<categories::Model> {
        let now = timestamp_now();
        let model = categories::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            image_url: Set(None),
            is_active: Set(true),
            display_order: Set(display_order),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .with_context(|| format!("Failed to create category {name}"))?;

        Ok(model)
    }

    pub async fn create_genre(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<genres::Model> {
        let now = timestamp_now();
        let model = genres::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            image_url: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .with_context(|| format!("Failed to create genre {name}"))?;

        Ok(model)
    }
}
