use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    /// Lowercased title and description
    pub search_text: String,

    pub release_year: Option<i32>,

    /// Runtime in minutes
    pub duration: Option<i32>,

    pub director: Option<String>,

    /// Comma separated cast list
    pub cast: Option<String>,

    pub rating_avg: f64,

    pub poster_url: Option<String>,

    pub backdrop_url: Option<String>,

    pub trailer_url: Option<String>,

    pub video_url: Option<String>,

    /// e.g. `PG-13`, `16+`
    pub maturity_rating: Option<String>,

    pub view_count: i64,

    pub is_active: bool,

    pub is_featured: bool,

    pub category_id: i32,

    pub tmdb_id: Option<i64>,

    pub imdb_id: Option<String>,

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
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
