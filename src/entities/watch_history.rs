use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "watch_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub tmdb_id: i64,

    pub media_type: String,

    pub season_number: Option<i32>,

    pub episode_number: Option<i32>,

    pub content_key: String,

    pub title: String,

    pub poster_path: Option<String>,

    /// Seconds watched
    pub progress: i32,

    /// Total length in seconds, when known
    pub duration: Option<i32>,

    pub completed: bool,

    pub watched_at: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
