use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl Migration {
    async fn create_with_indexes<E>(
        manager: &SchemaManager<'_>,
        schema: &Schema,
        entity: E,
    ) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        manager
            .create_table(
                schema
                    .create_table_from_entity(entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        for mut index in schema.create_index_from_entity(entity) {
            manager.create_index(index.if_not_exists().to_owned()).await?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so the foreign keys resolve.
        Self::create_with_indexes(manager, &schema, Users).await?;
        Self::create_with_indexes(manager, &schema, Anime).await?;
        Self::create_with_indexes(manager, &schema, Comments).await?;
        Self::create_with_indexes(manager, &schema, Ratings).await?;
        Self::create_with_indexes(manager, &schema, Watchlists).await?;
        Self::create_with_indexes(manager, &schema, WatchlistAnime).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchlistAnime).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Watchlists).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Anime).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
