//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Post::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Post::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::Title).string_len(512).not_null())
                    .col(ColumnDef::new(Post::Body).text())
                    .col(ColumnDef::new(Post::FeatureImage).string_len(512))
                    .col(ColumnDef::new(Post::Slug).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Post::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Post::Published).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Post::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique composite index: (author_id, slug). Slugs are unique per
        // author only; this also closes the race between concurrent writes
        // computing the same slug.
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_id_slug")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .col(Post::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status + published (for the public index listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status_published")
                    .table(Post::Table)
                    .col(Post::Status)
                    .col(Post::Published)
                    .to_owned(),
            )
            .await?;

        // Foreign key: author_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_post_author_id")
                    .from(Post::Table, Post::AuthorId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    AuthorId,
    Title,
    Body,
    FeatureImage,
    Slug,
    Status,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
