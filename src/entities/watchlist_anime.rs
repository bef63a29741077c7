use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "watchlist_anime")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub watchlist_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub anime_id: i32,
    pub added_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::watchlists::Entity",
        from = "Column::WatchlistId",
        to = "super::watchlists::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Watchlist,
    #[sea_orm(
        belongs_to = "super::anime::Entity",
        from = "Column::AnimeId",
        to = "super::anime::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Anime,
}

impl Related<super::watchlists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watchlist.def()
    }
}

impl Related<super::anime::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Anime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
