//! Create profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::UserId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profile::Password).string_len(256))
                    .col(ColumnDef::new(Profile::BlogTitle).string_len(255))
                    .col(ColumnDef::new(Profile::Bio).text())
                    .col(ColumnDef::new(Profile::ProfilePicture).string_len(512))
                    .col(ColumnDef::new(Profile::CoverPhoto).string_len(512))
                    .col(ColumnDef::new(Profile::City).string_len(100))
                    .col(ColumnDef::new(Profile::Country).string_len(100))
                    .col(ColumnDef::new(Profile::Website).string_len(512))
                    .col(ColumnDef::new(Profile::Twitter).string_len(16))
                    .col(ColumnDef::new(Profile::Github).string_len(100))
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_profile_user_id")
                    .from(Profile::Table, Profile::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    UserId,
    Password,
    BlogTitle,
    Bio,
    ProfilePicture,
    CoverPhoto,
    City,
    Country,
    Website,
    Twitter,
    Github,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
