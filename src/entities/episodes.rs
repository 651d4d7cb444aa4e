use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub season_id: i32,

    pub episode_number: i32,

    pub title: Option<String>,

    pub description: Option<String>,

    /// Runtime in minutes
    pub duration: Option<i32>,

    pub video_url: Option<String>,

    pub thumbnail_url: Option<String>,

    /// `YYYY-MM-DD`
    pub release_date: Option<String>,

    pub view_count: i64,

    pub is_active: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seasons::Entity",
        from = "Column::SeasonId",
        to = "super::seasons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Season,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
