use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "series")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    /// Lowercased title and description
    pub search_text: String,

    pub release_year: Option<i32>,

    pub end_year: Option<i32>,

    pub creator: Option<String>,

    /// Comma separated cast list
    pub cast: Option<String>,

    /// `ongoing`, `completed` or `cancelled`
    pub status: String,

    pub rating_avg: f64,

    pub poster_url: Option<String>,

    pub backdrop_url: Option<String>,

    pub trailer_url: Option<String>,

    pub maturity_rating: Option<String>,

    pub view_count: i64,

    pub is_active: bool,

    pub is_featured: bool,

    pub category_id: i32,

    pub tmdb_id: Option<i64>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(has_many = "super::seasons::Entity")]
    Seasons,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seasons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
