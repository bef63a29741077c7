use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "watchlists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// A user owns at most one watchlist.
    #[sea_orm(unique)]
    pub user_id: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::watchlist_anime::Entity")]
    WatchlistAnime,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::anime::Entity> for Entity {
    fn to() -> RelationDef {
        super::watchlist_anime::Relation::Anime.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::watchlist_anime::Relation::Watchlist.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
