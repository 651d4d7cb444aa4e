use sea_orm::entity::prelude::*;

/// Poster, backdrop, trailer or other asset attached to exactly one catalog
/// entity, addressed by (`parent_kind`, `parent_id`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub url: String,

    /// `poster`, `backdrop`, `thumbnail`, `video`, `trailer` or `other`
    pub media_type: String,

    pub title: Option<String>,

    pub description: Option<String>,

    /// `movie`, `series`, `season` or `episode`
    pub parent_kind: String,

    pub parent_id: i32,

    pub is_default: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
