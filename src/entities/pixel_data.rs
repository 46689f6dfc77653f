use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pixel_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub search_id: i32,
    /// Blue
    pub band_2: f64,
    /// Green
    pub band_3: f64,
    /// Red
    pub band_4: f64,
    /// NIR
    pub band_5: f64,
    /// SWIR1
    pub band_6: f64,
    /// SWIR2
    pub band_7: f64,
    pub is_center: bool,
    /// 0-8, row-major within the 3x3 grid
    pub grid_position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::searches::Entity",
        from = "Column::SearchId",
        to = "super::searches::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Search,
}

impl Related<super::searches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Search.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
