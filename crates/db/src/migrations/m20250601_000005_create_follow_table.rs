//! Create follow table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Follow::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Follow::FollowerId).string_len(32).not_null())
                    .col(ColumnDef::new(Follow::FolloweeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Follow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique composite index: one follow edge per (follower, followee)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_follower_id_followee_id")
                    .table(Follow::Table)
                    .col(Follow::FollowerId)
                    .col(Follow::FolloweeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: followee_id (follower listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_followee_id")
                    .table(Follow::Table)
                    .col(Follow::FolloweeId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: follower_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_follow_follower_id")
                    .from(Follow::Table, Follow::FollowerId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: followee_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_follow_followee_id")
                    .from(Follow::Table, Follow::FolloweeId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follow {
    Table,
    Id,
    FollowerId,
    FolloweeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
