use crate::entities::prelude::*;
use crate::entities::{favorites, ratings, watch_history, watchlist};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Favorites)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Ratings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(WatchHistory)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Watchlist)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One unique index per nullable target column.
        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_user_movie")
                    .table(Favorites)
                    .col(favorites::Column::UserId)
                    .col(favorites::Column::MovieId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_user_series")
                    .table(Favorites)
                    .col(favorites::Column::UserId)
                    .col(favorites::Column::SeriesId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_content")
                    .table(Ratings)
                    .col(ratings::Column::UserId)
                    .col(ratings::Column::ContentKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_user_content")
                    .table(WatchHistory)
                    .col(watch_history::Column::UserId)
                    .col(watch_history::Column::ContentKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_user_watched_at")
                    .table(WatchHistory)
                    .col(watch_history::Column::UserId)
                    .col(watch_history::Column::WatchedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_user_completed")
                    .table(WatchHistory)
                    .col(watch_history::Column::UserId)
                    .col(watch_history::Column::Completed)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watchlist_user_content")
                    .table(Watchlist)
                    .col(watchlist::Column::UserId)
                    .col(watchlist::Column::TmdbId)
                    .col(watchlist::Column::MediaType)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Watchlist).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WatchHistory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites).to_owned())
            .await?;

        Ok(())
    }
}
