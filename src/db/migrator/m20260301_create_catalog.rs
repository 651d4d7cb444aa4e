use crate::entities::prelude::*;
use crate::entities::{episodes, media, movie_genres, seasons, series_genres};
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
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Genres)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Movies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Series)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Seasons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Episodes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MovieGenres)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SeriesGenres)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Media)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genres_unique")
                    .table(MovieGenres)
                    .col(movie_genres::Column::MovieId)
                    .col(movie_genres::Column::GenreId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_series_genres_unique")
                    .table(SeriesGenres)
                    .col(series_genres::Column::SeriesId)
                    .col(series_genres::Column::GenreId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seasons_series_number")
                    .table(Seasons)
                    .col(seasons::Column::SeriesId)
                    .col(seasons::Column::SeasonNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_episodes_season_number")
                    .table(Episodes)
                    .col(episodes::Column::SeasonId)
                    .col(episodes::Column::EpisodeNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_parent")
                    .table(Media)
                    .col(media::Column::ParentKind)
                    .col(media::Column::ParentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // At most one default asset per (parent, media type).
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_media_single_default \
                 ON media(parent_kind, parent_id, media_type) WHERE is_default = 1",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_media_single_default")
            .await?;

        manager
            .drop_table(Table::drop().table(Media).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeriesGenres).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovieGenres).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Episodes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Seasons).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Series).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;

        Ok(())
    }
}
