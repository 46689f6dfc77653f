use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "searches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub scene_id: String,
    pub cloud_cover: Option<f64>,
    /// RFC 3339 UTC with microsecond precision, so text order is time order.
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

    #[sea_orm(has_many = "super::pixel_data::Entity")]
    PixelData,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::pixel_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PixelData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
