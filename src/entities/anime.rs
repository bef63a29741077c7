use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display title. Uniqueness is checked on import/create, not by the schema.
    #[sea_orm(indexed)]
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub synopsis: Option<String>,

    pub image: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub episode_count: Option<i32>,

    /// Minutes per episode
    pub episode_length: Option<i32>,

    pub subtype: Option<String>,
    pub status: Option<String>,
    pub age_rating_guide: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::watchlist_anime::Entity")]
    WatchlistAnime,
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::watchlists::Entity> for Entity {
    fn to() -> RelationDef {
        super::watchlist_anime::Relation::Watchlist.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::watchlist_anime::Relation::Anime.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
