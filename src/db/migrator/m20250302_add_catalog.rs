use crate::db::schema::{Genres as GenreCols, KindTables, Media, MediaGenre, MediaLink, Users as UserCols};
use crate::domain::{KindDescriptor, MediaKind, WatchStatus};
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(
                schema
                    .create_table_from_entity(Genres)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_genres_name_key")
                    .table(GenreCols::Table)
                    .col(GenreCols::NameKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        for kind in MediaKind::ALL {
            let descriptor = kind.descriptor();
            create_media_table(manager, descriptor).await?;
            create_genre_join(manager, descriptor).await?;
            create_link_table(manager, descriptor).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for kind in MediaKind::ALL {
            let descriptor = kind.descriptor();
            for table in [
                descriptor.link_table(),
                descriptor.genre_table(),
                descriptor.media_table(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
        }

        manager
            .drop_table(Table::drop().table(Genres).to_owned())
            .await
    }
}

async fn create_media_table(
    manager: &SchemaManager<'_>,
    descriptor: &KindDescriptor,
) -> Result<(), DbErr> {
    let mut table = Table::create();
    table
        .table(descriptor.media_table())
        .if_not_exists()
        .col(
            ColumnDef::new(Media::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Media::Title).string_len(255).not_null())
        .col(ColumnDef::new(Media::TitleSearch).text().not_null())
        .col(ColumnDef::new(Media::YearReleased).integer().null());

    if descriptor.has_episodes {
        table
            .col(ColumnDef::new(Media::Seasons).integer().null())
            .col(ColumnDef::new(Media::Episodes).integer().null());
    }

    table.col(ColumnDef::new(Media::Description).text().null());

    manager.create_table(table.to_owned()).await?;

    manager
        .create_index(
            Index::create()
                .name(format!("idx_{}_title", descriptor.table))
                .table(descriptor.media_table())
                .col(Media::Title)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn create_genre_join(
    manager: &SchemaManager<'_>,
    descriptor: &KindDescriptor,
) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(descriptor.genre_table())
                .if_not_exists()
                .col(ColumnDef::new(MediaGenre::MediaId).integer().not_null())
                .col(ColumnDef::new(MediaGenre::GenreId).integer().not_null())
                .primary_key(
                    Index::create()
                        .name(format!("pk_{}", descriptor.genre_table))
                        .col(MediaGenre::MediaId)
                        .col(MediaGenre::GenreId),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{}_media_id", descriptor.genre_table))
                        .from(descriptor.genre_table(), MediaGenre::MediaId)
                        .to(descriptor.media_table(), Media::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{}_genre_id", descriptor.genre_table))
                        .from(descriptor.genre_table(), MediaGenre::GenreId)
                        .to(GenreCols::Table, GenreCols::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
}

async fn create_link_table(
    manager: &SchemaManager<'_>,
    descriptor: &KindDescriptor,
) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(descriptor.link_table())
                .if_not_exists()
                .col(
                    ColumnDef::new(MediaLink::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(MediaLink::UserId).integer().not_null())
                .col(ColumnDef::new(MediaLink::MediaId).integer().not_null())
                .col(ColumnDef::new(MediaLink::Rate).double().null())
                .col(
                    ColumnDef::new(MediaLink::Status)
                        .string_len(15)
                        .not_null()
                        .default(WatchStatus::default().as_str()),
                )
                .col(ColumnDef::new(MediaLink::Comment).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{}_user_id", descriptor.link_table))
                        .from(descriptor.link_table(), MediaLink::UserId)
                        .to(UserCols::Table, UserCols::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{}_media_id", descriptor.link_table))
                        .from(descriptor.link_table(), MediaLink::MediaId)
                        .to(descriptor.media_table(), Media::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    // At most one link per (user, media) pair.
    manager
        .create_index(
            Index::create()
                .name(format!("uq_{}_user_media", descriptor.link_table))
                .table(descriptor.link_table())
                .col(MediaLink::UserId)
                .col(MediaLink::MediaId)
                .unique()
                .if_not_exists()
                .to_owned(),
        )
        .await
}
