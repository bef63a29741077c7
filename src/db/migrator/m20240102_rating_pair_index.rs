use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Backs the derived user_anime_key with a real composite constraint.
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_anime")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::AnimeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ratings_user_anime")
                    .table(Ratings::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    UserId,
    AnimeId,
}
